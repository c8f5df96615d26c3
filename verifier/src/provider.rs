//! # Verifier Provider
//!
//! The verifier's external collaborators: DID resolution, status list
//! retrieval, persistence of verification records, and configuration.

use std::future::Future;

use anyhow::Result;
pub use verity_core::did::DidResolver;
pub use verity_status::StatusListFetcher;

use crate::config::Config;
use crate::types::{Submission, Verification};

/// Verifier Provider trait.
pub trait Provider:
    DidResolver + StatusListFetcher + VerificationStore + Configuration + Clone
{
}

/// A blanket implementation for `Provider` trait so that any type
/// implementing the required super traits is considered a `Provider`.
impl<T> Provider for T where
    T: DidResolver + StatusListFetcher + VerificationStore + Configuration + Clone
{
}

/// `VerificationStore` persists verification records.
pub trait VerificationStore: Send + Sync {
    /// Store a new verification.
    fn create(&self, verification: &Verification) -> impl Future<Output = Result<()>> + Send;

    /// Retrieve a verification by id.
    fn find(&self, id: &str) -> impl Future<Output = Result<Option<Verification>>> + Send;

    /// Apply a submission outcome to the verification, conditional on the
    /// record not already holding a credential submission. When `force` is
    /// set, the update is applied regardless.
    ///
    /// Returns `false`, without updating, when the condition fails. The
    /// check and the update must be atomic.
    fn save_submission(
        &self, id: &str, submission: &Submission, force: bool,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// The `Configuration` trait is used by implementers to provide verifier
/// settings to the library.
pub trait Configuration: Send + Sync {
    /// The verifier's current configuration.
    fn config(&self) -> impl Future<Output = Result<Config>> + Send;
}
