// ── Core error types ──
//
// Terminal failures of one reconciliation or info lookup. A 404 from the
// existence probe never shows up here: it drives the create/delete branch
// instead. Everything else is surfaced verbatim, without retry.

use thiserror::Error;

use crate::reconcile::{RemoteError, RemoteErrorKind};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Before any remote call ───────────────────────────────────────
    #[error("{resource} does not support {operation}")]
    Unsupported { resource: String, operation: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Remote failures ──────────────────────────────────────────────
    /// The service answered with a non-2xx status (other than a probe 404).
    /// `message` is the service's own text, passed through unchanged.
    #[error("{message}")]
    RemoteRejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot connect to {service}: {reason}")]
    ConnectionFailed { service: String, reason: String },

    #[error("Request to {service} timed out")]
    Timeout { service: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status of the remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the failure happened before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Unsupported { .. } | Self::ValidationFailed { .. })
    }
}

// ── Conversion from bound-operation errors ───────────────────────────

impl From<RemoteError> for CoreError {
    fn from(err: RemoteError) -> Self {
        let RemoteError {
            kind,
            code,
            message,
            service,
        } = err;

        match kind {
            RemoteErrorKind::Status(status) => CoreError::RemoteRejected {
                status,
                code,
                message,
            },
            RemoteErrorKind::Authentication => CoreError::AuthenticationFailed { message },
            RemoteErrorKind::Connection => CoreError::ConnectionFailed {
                service,
                reason: message,
            },
            RemoteErrorKind::Timeout => CoreError::Timeout { service },
            RemoteErrorKind::InvalidRequest => CoreError::ValidationFailed { message },
            RemoteErrorKind::Other => CoreError::Internal(message),
        }
    }
}

impl From<iamctl_api::Error> for CoreError {
    fn from(err: iamctl_api::Error) -> Self {
        RemoteError::from(err).into()
    }
}
