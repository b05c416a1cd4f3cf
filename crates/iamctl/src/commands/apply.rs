//! `iamctl apply`: reconcile one resource.

use serde_json::Value;
use tracing::info;

use crate::cli::{ApplyArgs, GlobalOpts, OutputFormat, StateArg};
use crate::commands::util;
use crate::config;
use crate::error::CliError;
use crate::output::{self, OutputOpts};

pub async fn handle(args: ApplyArgs, global: &GlobalOpts, out: OutputOpts) -> Result<(), CliError> {
    let spec = util::resource(&args.resource)?;
    let mut params = util::collect_params(&args.params)?;

    if let Some(state) = args.state {
        let state = match state {
            StateArg::Present => "present",
            StateArg::Absent => "absent",
        };
        params.insert("state".into(), Value::String(state.into()));
    }
    if let Some(etag) = args.if_match {
        params.insert("if_match".into(), Value::String(etag));
    }

    // Reject bad parameters before touching credentials or the network.
    iamctl_core::prepare(spec, params.clone())?;

    let client = config::service_client(global, spec.service)?;
    let outcome = iamctl_core::apply(&client, spec, params).await?;
    info!(resource = spec.name, changed = outcome.changed(), "applied");

    let doc = outcome.to_document();
    if out.format == OutputFormat::Table && !out.quiet {
        eprintln!("{}", output::status_line(&doc, spec.name, out.color));
    }
    out.document(&doc)
}
