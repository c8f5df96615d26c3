//! Binding credentials to the verification's subject address.

use std::sync::LazyLock;

use anyhow::{Context, anyhow};
use regex::Regex;
use verity_core::did::DidResolver;
use verity_core::key::is_ethereum_address;

use crate::Result;
use crate::error::invalid;
use crate::results::solana;

static EIP155_ACCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"eip155:([-a-zA-Z\d]{1,32}):(0x[a-fA-F\d]{1,64})").expect("should compile")
});
static SOLANA_ACCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^solana:([-a-zA-Z\d]{1,32}):([1-9A-HJ-NP-Za-km-z]{32,44})$")
        .expect("should compile")
});

/// Confirm the credential's subject DID resolves to the address being
/// verified. Ethereum addresses are compared case-insensitively.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` if the subject is missing, cannot be
/// resolved to an address, or resolves to a different address.
pub async fn assert_subject_matches(
    request_address: &str, subject_did: Option<&str>, resolver: &impl DidResolver,
) -> Result<()> {
    let Some(did) = subject_did.filter(|d| !d.is_empty()) else {
        return Err(invalid!("Encountered invalid credential. Subject ID not found."));
    };

    let address = did_to_address(did, resolver).await.map_err(|e| {
        tracing::info!(did, error = %e, "failed to convert subject did to an address");
        invalid!("Failed to parse did {did}")
    })?;

    let matches = if is_ethereum_address(&address) {
        address.eq_ignore_ascii_case(request_address)
    } else {
        address == request_address
    };
    if !matches {
        return Err(invalid!(
            "Credential subject does not match the subject in the verification request. {address} is not equal to {request_address}"
        ));
    }
    Ok(())
}

/// Resolve a `did:pkh` DID to the address of its account: an Ethereum
/// address for `eip155` accounts, a base58 public key for `solana` accounts.
///
/// # Errors
///
/// Returns an error if the DID does not resolve to a document whose first
/// verification method holds an `eip155` or `solana` account with a valid
/// address.
pub async fn did_to_address(did: &str, resolver: &impl DidResolver) -> anyhow::Result<String> {
    let document = resolver.resolve(did).await.with_context(|| format!("DID resolve error: {did}"))?;
    let method = document
        .verification_method
        .first()
        .ok_or_else(|| anyhow!("DID resolve error: {did}: no verification method"))?;
    let account = method
        .blockchain_account_id
        .as_deref()
        .ok_or_else(|| anyhow!("DID resolve error: blockchainAccountId not found for {did}"))?;

    if let Some(caps) = EIP155_ACCOUNT.captures(account) {
        let address = &caps[2];
        if !is_ethereum_address(address) {
            return Err(anyhow!("invalid Ethereum address: {address}"));
        }
        return Ok(address.to_string());
    }

    let caps = SOLANA_ACCOUNT
        .captures(account)
        .ok_or_else(|| anyhow!("unsupported account: {account}"))?;
    let address = &caps[2];
    solana::public_key(address).map_err(|_| anyhow!("invalid Solana address: {address}"))?;
    Ok(address.to_string())
}
