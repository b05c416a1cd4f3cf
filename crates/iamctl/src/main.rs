mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::output::OutputOpts;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let cfg = config::load_config_or_default();
    let out = OutputOpts {
        format: config::output_format(&cli.global, &cfg),
        color: output::should_color(config::color_mode(&cli.global, &cfg)),
        quiet: cli.global.quiet,
    };
    // Only apply and info report a result document on failure.
    let reports = matches!(cli.command, Command::Apply(_) | Command::Info(_));

    tracing::debug!(command = ?cli.command, "dispatching command");
    if let Err(err) = commands::dispatch(cli.command, &cli.global, out).await {
        if reports && out.format.is_structured() {
            if let Ok(doc) = output::render_document(out.format, &output::failure_document(&err)) {
                output::print_output(&doc, out.quiet);
            }
        }
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
