//! # Verifier Errors
//!
//! Every failure surfaces as exactly one human-readable message. Client-input
//! failures carry their message verbatim; internal failures are logged with
//! detail and surface only as `Internal server error`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The public message for internal failures.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Verifier error codes.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The submission or request is malformed, fails verification, or
    /// conflicts with the verification's current state.
    #[error(r#"{{"error": "invalid_request", "error_description": "{0}"}}"#)]
    InvalidRequest(String),

    /// The requested verification does not exist.
    #[error(r#"{{"error": "not_found", "error_description": "{0}"}}"#)]
    NotFound(String),

    /// The verifier encountered an unexpected condition that prevented it
    /// from fulfilling the request.
    #[error(r#"{{"error": "server_error", "error_description": "{0}"}}"#)]
    ServerError(String),
}

impl Error {
    /// The message to return to callers. Internal details are withheld.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidRequest(msg) | Self::NotFound(msg) => msg,
            Self::ServerError(_) => INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for failures caused by the caller's input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::NotFound(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<Self>() {
            Some(Self::InvalidRequest(e)) => Self::InvalidRequest(format!("{err}: {e}")),
            Some(Self::NotFound(e)) => Self::NotFound(format!("{err}: {e}")),
            Some(Self::ServerError(e)) => Self::ServerError(format!("{err}: {e}")),
            None => {
                let stack = err.chain().fold(String::new(), |cause, e| format!("{cause} -> {e}"));
                let stack = stack.trim_start_matches(" -> ").to_string();
                Self::ServerError(stack)
            }
        }
    }
}

impl From<verity_vdc::Error> for Error {
    fn from(err: verity_vdc::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<verity_status::Error> for Error {
    fn from(err: verity_status::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// Construct an `Error::InvalidRequest` error from a string or existing error
/// value.
macro_rules! invalid {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidRequest(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::InvalidRequest(format!($err))
    };
}
pub(crate) use invalid;

/// Construct an `Error::ServerError` error from a string or existing error
/// value.
macro_rules! server {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::ServerError(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::ServerError(format!($err))
    };
}
pub(crate) use server;
