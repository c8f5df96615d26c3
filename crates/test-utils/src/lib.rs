//! # Test Utilities
//!
//! Key holders, DID resolution, status lists and an in-memory verifier
//! provider for tests.

pub mod verifier;

mod datastore;
mod identity;
mod status;

pub use datastore::Store;
pub use identity::{Holder, Resolver};
pub use status::StatusLists;
pub use verifier::Verifier;
