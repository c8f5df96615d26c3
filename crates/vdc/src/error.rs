//! # Envelope Errors

use thiserror::Error;

/// Errors raised while decoding credential and presentation envelopes.
/// Messages are reported to callers verbatim.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The presentation could not be decoded, verified, or validated.
    #[error("Input isn't a valid Verifiable Presentation. {0}")]
    InvalidPresentation(String),

    /// The presentation's challenge is missing or does not match.
    #[error("Input isn't a valid Verifiable Presentation. Nonce is invalid.")]
    InvalidNonce,

    /// The credential's signature does not verify.
    #[error("Input isn't a valid Verifiable Credential. Invalid signature.")]
    InvalidSignature,

    /// The credential could not be decoded or validated.
    #[error("Input isn't a valid Verifiable Credential. {0}")]
    InvalidCredential(String),
}
