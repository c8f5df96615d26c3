//! # Verifier Provider
//!
//! A [`Provider`](verity_verifier::provider::Provider) backed by memory:
//! offline DID resolution, in-memory status lists and verification records,
//! and a settable configuration.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use verity_core::did::{DidResolver, Document};
use verity_status::{Error as StatusError, StatusListFetcher};
use verity_verifier::Config;
use verity_verifier::provider::{Configuration, VerificationStore};
use verity_verifier::types::{Submission, Verification};

use crate::datastore::Store;
use crate::identity::Resolver;
use crate::status::StatusLists;

/// The well-known development key used to sign results in tests.
pub const SIGNING_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The address of [`SIGNING_KEY`].
pub const SIGNER_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// The verifier's DID.
pub const VERIFIER_DID: &str = "did:web:verifier.example.com";

/// In-memory verifier provider.
#[derive(Clone)]
pub struct Verifier {
    /// Published status lists.
    pub status_lists: StatusLists,

    /// Verification records.
    pub store: Store,

    config: Arc<RwLock<Config>>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier {
    /// A verifier signing with [`SIGNING_KEY`].
    #[must_use]
    pub fn new() -> Self {
        let config = Config {
            verifier_private_key: Some(SIGNING_KEY.to_string()),
            verifier_did: Some(VERIFIER_DID.to_string()),
            ..Config::default()
        };
        Self::with_config(config)
    }

    /// A verifier with `config`.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            status_lists: StatusLists::default(),
            store: Store::default(),
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Change the configuration.
    pub fn configure(&self, f: impl FnOnce(&mut Config)) {
        let mut config = self.config.write().expect("should lock");
        f(&mut *config);
    }
}

impl DidResolver for Verifier {
    async fn resolve(&self, did: &str) -> Result<Document> {
        Resolver.resolve(did).await
    }
}

impl StatusListFetcher for Verifier {
    async fn fetch(&self, url: &str) -> Result<String, StatusError> {
        self.status_lists.fetch(url).await
    }
}

impl VerificationStore for Verifier {
    async fn create(&self, verification: &Verification) -> Result<()> {
        self.store.put(verification)
    }

    async fn find(&self, id: &str) -> Result<Option<Verification>> {
        self.store.get(id)
    }

    async fn save_submission(&self, id: &str, submission: &Submission, force: bool) -> Result<bool> {
        self.store.update(id, submission, force)
    }
}

impl Configuration for Verifier {
    async fn config(&self) -> Result<Config> {
        let config = self.config.read().map_err(|_| anyhow::anyhow!("issue locking"))?;
        Ok(config.clone())
    }
}
