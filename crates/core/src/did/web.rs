//! `did:web` resolution.
//!
//! `did:web:example.com` resolves to `https://example.com/.well-known/did.json`
//! and `did:web:example.com:user:alice` to
//! `https://example.com/user/alice/did.json`. A percent-encoded port
//! (`example.com%3A3000`) is decoded.

use anyhow::{Context, Result, bail};

use super::{Did, Document};

pub async fn resolve(did: &Did<'_>, client: &reqwest::Client) -> Result<Document> {
    let url = document_url(did.id)?;
    tracing::debug!(url, "fetching did:web document");

    let response = client.get(&url).send().await.context("fetching did:web document")?;
    if !response.status().is_success() {
        bail!("did:web document not found at {url}: {}", response.status());
    }
    let document: Document = response.json().await.context("parsing did:web document")?;

    let expected = format!("did:web:{}", did.id);
    if document.id != expected {
        bail!("did:web document id {} does not match {expected}", document.id);
    }
    Ok(document)
}

fn document_url(id: &str) -> Result<String> {
    let mut segments = id.split(':');
    let Some(domain) = segments.next().filter(|d| !d.is_empty()) else {
        bail!("did:web is missing a domain");
    };
    let domain = domain.replace("%3A", ":").replace("%3a", ":");
    let path: Vec<&str> = segments.collect();

    if path.is_empty() {
        Ok(format!("https://{domain}/.well-known/did.json"))
    } else {
        Ok(format!("https://{domain}/{}/did.json", path.join("/")))
    }
}
