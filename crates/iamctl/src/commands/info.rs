//! `iamctl info`: read-only lookups.

use crate::cli::{GlobalOpts, InfoArgs};
use crate::commands::util;
use crate::config;
use crate::error::CliError;
use crate::output::OutputOpts;

pub async fn handle(args: InfoArgs, global: &GlobalOpts, out: OutputOpts) -> Result<(), CliError> {
    let spec = util::resource(&args.resource)?;
    let params = util::collect_params(&args.params)?;

    // Reject bad parameters before touching credentials or the network.
    iamctl_core::prepare_lookup(spec, params.clone())?;

    let client = config::service_client(global, spec.service)?;
    let doc = iamctl_core::info(&client, spec, params).await?;
    out.document(&doc)
}
