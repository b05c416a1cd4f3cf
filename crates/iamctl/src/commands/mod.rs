//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod apply;
pub mod config_cmd;
pub mod info;
pub mod resources;
pub mod util;

use clap::CommandFactory;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;
use crate::output::OutputOpts;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, out: OutputOpts) -> Result<(), CliError> {
    match cmd {
        Command::Apply(args) => apply::handle(args, global, out).await,
        Command::Info(args) => info::handle(args, global, out).await,
        Command::Resources(args) => resources::handle(&args, out),
        Command::Config(args) => config_cmd::handle(args, global, out),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "iamctl", &mut std::io::stdout());
            Ok(())
        }
    }
}
