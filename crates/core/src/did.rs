//! # DID Resolution
//!
//! Resolves `did:key`, `did:web`, and `did:pkh` identifiers to DID documents.
//! Each method is implemented in its own module; [`Resolver`] dispatches on
//! the method name.

mod document;
mod key;
mod pkh;
mod web;

use std::future::Future;
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};

pub use self::document::{Document, VerificationMethod};

/// Resolves a DID to its DID document.
pub trait DidResolver: Send + Sync {
    /// Resolve `did` (fragment and query are ignored) to a DID document.
    fn resolve(&self, did: &str) -> impl Future<Output = Result<Document>> + Send;
}

/// Supported DID methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// `did:key`
    Key,

    /// `did:web`
    Web,

    /// `did:pkh`
    Pkh,
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "key" => Ok(Self::Key),
            "web" => Ok(Self::Web),
            "pkh" => Ok(Self::Pkh),
            _ => Err(anyhow!("unsupported DID method: {s}")),
        }
    }
}

/// The parts of a DID: `did:<method>:<method-specific-id>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Did<'a> {
    /// Method name.
    pub method: &'a str,

    /// Method-specific identifier.
    pub id: &'a str,
}

impl<'a> Did<'a> {
    /// Split a DID or DID URL into method and method-specific identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if `did` is not of the form `did:<method>:<id>`.
    pub fn parse(did: &'a str) -> Result<Self> {
        let did = did.split(['#', '?']).next().unwrap_or_default();
        let mut parts = did.splitn(3, ':');
        let (Some("did"), Some(method), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("invalid DID: {did}");
        };
        if method.is_empty() || id.is_empty() {
            bail!("invalid DID: {did}");
        }
        Ok(Self { method, id })
    }
}

/// Resolver for every supported DID method.
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    client: reqwest::Client,
}

impl Resolver {
    /// Create a resolver that uses `client` to fetch `did:web` documents.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl DidResolver for Resolver {
    async fn resolve(&self, did: &str) -> Result<Document> {
        let parsed = Did::parse(did)?;
        tracing::debug!(method = parsed.method, "resolving DID");

        match parsed.method.parse()? {
            Method::Key => key::resolve(&parsed),
            Method::Pkh => pkh::resolve(&parsed),
            Method::Web => web::resolve(&parsed, &self.client).await,
        }
    }
}

/// Resolve a DID using only the methods that need no network access
/// (`did:key` and `did:pkh`).
///
/// # Errors
///
/// Returns an error if the DID is malformed or uses another method.
pub fn resolve_offline(did: &str) -> Result<Document> {
    let parsed = Did::parse(did)?;
    match parsed.method.parse()? {
        Method::Key => key::resolve(&parsed),
        Method::Pkh => pkh::resolve(&parsed),
        Method::Web => Err(anyhow!("did:web requires network resolution")),
    }
}
