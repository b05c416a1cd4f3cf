//! Shared helpers for command handlers.

use std::path::Path;

use serde_json::{Map, Value};

use iamctl_core::{DesiredState, ResourceSpec};

use crate::cli::ParamArgs;
use crate::error::CliError;

/// Look up a catalog entry by name.
pub fn resource(name: &str) -> Result<&'static ResourceSpec, CliError> {
    iamctl_core::find(name).ok_or_else(|| CliError::UnknownResource { name: name.into() })
}

/// Merge `--params-file` and `-P` arguments into one parameter map.
///
/// `-P` wins over the file.
pub fn collect_params(args: &ParamArgs) -> Result<DesiredState, CliError> {
    let mut params = match args.params_file {
        Some(ref path) => read_params_file(path)?,
        None => Map::new(),
    };
    for raw in &args.params {
        let (name, value) = parse_assignment(raw)?;
        params.insert(name, value);
    }
    Ok(params)
}

/// Parse one `NAME=VALUE` or `NAME:=JSON`.
///
/// `NAME=VALUE` keeps VALUE as a string unless it starts with `{`, `[` or
/// `"` and parses as JSON. `NAME:=JSON` always parses VALUE as JSON, for
/// booleans, numbers and `null`.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), CliError> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(CliError::Validation {
            field: "param".into(),
            reason: format!("expected NAME=VALUE or NAME:=JSON, got '{raw}'"),
        });
    };
    let (name, typed) = match name.strip_suffix(':') {
        Some(name) => (name.trim(), true),
        None => (name.trim(), false),
    };
    if name.is_empty() {
        return Err(CliError::Validation {
            field: "param".into(),
            reason: format!("missing parameter name in '{raw}'"),
        });
    }

    let value = if typed {
        serde_json::from_str(value).map_err(|e| CliError::Validation {
            field: name.into(),
            reason: format!("'{value}' is not valid JSON: {e}"),
        })?
    } else if value.starts_with(['{', '[', '"']) {
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()))
    } else {
        Value::String(value.to_owned())
    };
    Ok((name.to_owned(), value))
}

/// Read a JSON (`.json`) or YAML (anything else) mapping of parameters.
pub fn read_params_file(path: &Path) -> Result<DesiredState, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let value: Value = if is_json {
        serde_json::from_str(&contents)?
    } else {
        serde_yaml::from_str(&contents)?
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(CliError::Validation {
            field: "params-file".into(),
            reason: format!("{} must contain a mapping of parameters", path.display()),
        }),
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_values_stay_strings() {
        assert_eq!(
            parse_assignment("name=2024").expect("valid"),
            ("name".to_owned(), json!("2024"))
        );
        assert_eq!(
            parse_assignment("description=true").expect("valid"),
            ("description".to_owned(), json!("true"))
        );
        assert_eq!(
            parse_assignment("name=ops team").expect("valid"),
            ("name".to_owned(), json!("ops team"))
        );
        assert_eq!(
            parse_assignment("description=").expect("valid"),
            ("description".to_owned(), json!(""))
        );
        assert_eq!(
            parse_assignment("query=a=b").expect("valid"),
            ("query".to_owned(), json!("a=b"))
        );
    }

    #[test]
    fn structured_values_parse_as_json() {
        assert_eq!(
            parse_assignment(r#"rules=[{"name":"r"}]"#).expect("valid"),
            ("rules".to_owned(), json!([{ "name": "r" }]))
        );
        assert_eq!(
            parse_assignment(r#"name="2024""#).expect("valid"),
            ("name".to_owned(), json!("2024"))
        );
        assert_eq!(
            parse_assignment("description=[draft] notes").expect("valid"),
            ("description".to_owned(), json!("[draft] notes"))
        );
    }

    #[test]
    fn typed_assignments_require_json() {
        assert_eq!(
            parse_assignment("committed:=true").expect("valid"),
            ("committed".to_owned(), json!(true))
        );
        assert_eq!(
            parse_assignment("limit:=50").expect("valid"),
            ("limit".to_owned(), json!(50))
        );
        assert!(parse_assignment("committed:=yes").is_err());
    }

    #[test]
    fn malformed_assignments_are_rejected() {
        assert!(parse_assignment("name").is_err());
        assert!(parse_assignment("=value").is_err());
        assert!(parse_assignment(":=true").is_err());
    }

    #[test]
    fn flags_override_the_params_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "name: from-file\ndescription: kept\naccount_id: acct-1").expect("write");

        let args = ParamArgs {
            params: vec!["name=from-flag".into()],
            params_file: Some(file.path().to_path_buf()),
        };
        let params = collect_params(&args).expect("valid");

        assert_eq!(params["name"], json!("from-flag"));
        assert_eq!(params["description"], json!("kept"));
        assert_eq!(params["account_id"], json!("acct-1"));
    }

    #[test]
    fn json_params_file_must_be_a_mapping() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("tempfile");
        write!(file, "[1, 2]").expect("write");

        assert!(matches!(
            read_params_file(file.path()),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn unknown_resource_is_a_usage_error() {
        assert!(matches!(
            resource("iam_nothing"),
            Err(CliError::UnknownResource { .. })
        ));
        assert!(resource("iam_access_group").is_ok());
    }
}
