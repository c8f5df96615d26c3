//! # Credential Status Errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while checking a credential's status. Messages are
/// reported to callers verbatim; the wrapped value carries detail for logs.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The status list credential could not be fetched.
    #[error("StatusListCredential URL is not reachable.")]
    Unreachable(String),

    /// The status list response was not a usable status list.
    #[error("Response from StatusListCredential URL is invalid.")]
    InvalidResponse(String),
}

impl Error {
    /// Detail recorded with the error.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Unreachable(d) | Self::InvalidResponse(d) => d,
        }
    }
}
