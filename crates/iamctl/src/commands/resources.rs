//! `iamctl resources`: browse the resource catalog.

use serde::Serialize;
use tabled::Tabled;

use iamctl_core::{Op, ResourceSpec};

use crate::cli::ResourcesArgs;
use crate::commands::util;
use crate::config;
use crate::error::CliError;
use crate::output::{self, OutputOpts};

#[derive(Debug, Serialize, Tabled)]
struct ResourceRow {
    #[tabled(rename = "NAME")]
    name: &'static str,
    #[tabled(rename = "SERVICE")]
    service: String,
    #[tabled(rename = "OPERATIONS")]
    operations: String,
    #[tabled(rename = "SUMMARY")]
    summary: &'static str,
}

#[derive(Debug, Serialize, Tabled)]
struct ParamRow {
    #[tabled(rename = "PARAMETER")]
    name: &'static str,
    #[tabled(rename = "IN")]
    location: String,
    #[tabled(rename = "WIRE NAME")]
    wire: &'static str,
    #[tabled(rename = "OPERATIONS")]
    operations: String,
}

fn join_ops(ops: impl IntoIterator<Item = Op>) -> String {
    ops.into_iter()
        .map(|op| op.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn resource_row(spec: &'static ResourceSpec) -> ResourceRow {
    ResourceRow {
        name: spec.name,
        service: spec.service.to_string(),
        operations: join_ops(spec.operations()),
        summary: spec.summary,
    }
}

/// Identifier rows first (path), then the declared parameters.
fn param_rows(spec: &'static ResourceSpec) -> Vec<ParamRow> {
    let identity = spec.primary.iter().chain(spec.scope).copied().map(|name| ParamRow {
        name,
        location: "path".into(),
        wire: name,
        operations: join_ops(
            spec.operations()
                .into_iter()
                .filter(|op| spec.path_for(*op).is_some_and(|p| p.contains(&format!("{{{name}}}")))),
        ),
    });

    let declared = spec.params.iter().map(|param| ParamRow {
        name: param.name,
        location: param.location.to_string(),
        wire: param.wire,
        operations: join_ops(param.ops.iter().copied()),
    });

    identity.chain(declared).collect()
}

pub fn handle(args: &ResourcesArgs, out: OutputOpts) -> Result<(), CliError> {
    if let Some(ref name) = args.resource {
        let spec = util::resource(name)?;
        let rendered = output::render_rows(out.format, &param_rows(spec))?;
        output::print_output(&rendered, out.quiet);
        return Ok(());
    }

    let service = args.service.as_deref().map(config::parse_service).transpose()?;
    let rows: Vec<ResourceRow> = iamctl_core::catalog()
        .filter(|spec| service.is_none_or(|s| spec.service == s))
        .map(resource_row)
        .collect();

    let rendered = output::render_rows(out.format, &rows)?;
    output::print_output(&rendered, out.quiet);
    Ok(())
}
