//! An API for verifying holder submissions of identity attestations and
//! signing the results for on-chain registries.
//!
//! A verification is created for a subject address on a network
//! (`ethereum` or `solana`). The holder is offered a presentation definition
//! and a challenge, and submits a VP-JWT. The submission is checked for
//! signature validity, challenge binding, credential expiry, subject
//! binding, revocation status and conformance to the definition. On success
//! the verifier signs a verification result the network's registry can
//! verify.

pub mod checks;
pub mod config;
pub mod constraints;
pub mod generate;
pub mod jsonpath;
pub mod provider;
pub mod results;
pub mod schemas;
pub mod types;

mod error;
mod handlers;
mod verify;

pub use {verity_core as core, verity_status as status, verity_vdc as vdc};

pub use self::config::Config;
pub use self::error::Error;
pub use self::handlers::*;
pub use self::types::*;
pub use self::verify::{Verified, verify};

/// Result type for the verifier.
pub type Result<T, E = Error> = std::result::Result<T, E>;
