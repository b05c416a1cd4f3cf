//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use iamctl_config::ConfigError;
use iamctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {service}")]
    #[diagnostic(
        code(iamctl::connection_failed),
        help(
            "{reason}\n\
             Check the endpoint with `iamctl config show`, or override it with {env}_URL."
        )
    )]
    ConnectionFailed {
        service: String,
        env: String,
        reason: String,
    },

    #[error("Request to {service} timed out")]
    #[diagnostic(
        code(iamctl::timeout),
        help("Increase the timeout with --timeout or `iamctl config set timeout <secs>`.")
    )]
    Timeout { service: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(iamctl::auth_failed),
        help(
            "Verify the API key of the active profile.\n\
             Store a new one with: iamctl config set-key"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials for {service} (profile '{profile}')")]
    #[diagnostic(code(iamctl::no_credentials), help("{reason}"))]
    NoCredentials {
        service: String,
        profile: String,
        reason: String,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Unknown resource type '{name}'")]
    #[diagnostic(
        code(iamctl::unknown_resource),
        help("Run: iamctl resources")
    )]
    UnknownResource { name: String },

    #[error("{resource} does not support {operation}")]
    #[diagnostic(
        code(iamctl::unsupported),
        help("Run: iamctl resources {resource}")
    )]
    Unsupported { resource: String, operation: String },

    #[error("{message}")]
    #[diagnostic(code(iamctl::not_found))]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(iamctl::conflict),
        help("The resource changed since it was read. Re-run to pick up the current ETag.")
    )]
    Conflict { status: u16, message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(iamctl::api_error), help("HTTP {status}{code}"))]
    ApiError {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Internal error: {message}")]
    #[diagnostic(code(iamctl::internal))]
    Internal { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(iamctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(iamctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: iamctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(iamctl::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(iamctl::keyring),
        help("Use an environment variable instead, e.g. IBMCLOUD_API_KEY.")
    )]
    Keyring(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(iamctl::json))]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    #[diagnostic(code(iamctl::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(iamctl::config_write))]
    ConfigWrite(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::ApiError { status: 403, .. } | Self::Unsupported { .. } => {
                exit_code::PERMISSION
            }
            Self::ApiError { status: 401, .. } => exit_code::AUTH,
            Self::UnknownResource { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unsupported {
                resource,
                operation,
            } => CliError::Unsupported {
                resource,
                operation,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "parameters".into(),
                reason: message,
            },

            CoreError::RemoteRejected {
                status, message, ..
            } if status == 404 => CliError::NotFound { message },

            CoreError::RemoteRejected {
                status, message, ..
            } if status == 409 || status == 412 => CliError::Conflict { status, message },

            CoreError::RemoteRejected {
                status,
                code,
                message,
            } => CliError::ApiError {
                status,
                code: code.map(|c| format!(" ({c})")).unwrap_or_default(),
                message,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::ConnectionFailed { service, reason } => CliError::ConnectionFailed {
                env: service.to_ascii_uppercase(),
                service,
                reason,
            },

            CoreError::Timeout { service } => CliError::Timeout { service },

            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials {
                service,
                profile,
                reason,
            } => CliError::NoCredentials {
                service,
                profile,
                reason,
            },
            ConfigError::Keyring(e) => CliError::Keyring(e.to_string()),
            ConfigError::Serialization(e) => CliError::ConfigWrite(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16) -> CliError {
        CoreError::RemoteRejected {
            status,
            code: Some("x".into()),
            message: "nope".into(),
        }
        .into()
    }

    #[test]
    fn remote_statuses_pick_exit_codes() {
        assert_eq!(rejected(404).exit_code(), exit_code::NOT_FOUND);
        assert_eq!(rejected(409).exit_code(), exit_code::CONFLICT);
        assert_eq!(rejected(412).exit_code(), exit_code::CONFLICT);
        assert_eq!(rejected(403).exit_code(), exit_code::PERMISSION);
        assert_eq!(rejected(401).exit_code(), exit_code::AUTH);
        assert_eq!(rejected(500).exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn remote_message_is_shown_verbatim() {
        assert_eq!(rejected(500).to_string(), "nope");
    }

    #[test]
    fn local_failures_are_usage_or_auth() {
        let invalid: CliError = CoreError::ValidationFailed {
            message: "unknown parameter 'typo' for iam_access_group".into(),
        }
        .into();
        assert_eq!(invalid.exit_code(), exit_code::USAGE);

        let info_only: CliError = CoreError::Unsupported {
            resource: "iam_access_group_members".into(),
            operation: "apply".into(),
        }
        .into();
        assert_eq!(info_only.exit_code(), exit_code::PERMISSION);

        let creds: CliError = ConfigError::NoCredentials {
            service: "schematics".into(),
            profile: "default".into(),
            reason: "set SCHEMATICS_APIKEY".into(),
        }
        .into();
        assert_eq!(creds.exit_code(), exit_code::AUTH);
    }
}
