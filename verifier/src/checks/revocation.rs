//! Revocation via `StatusList2021`.
//!
//! Checking fails closed: when the status list cannot be fetched, verified or
//! read, the credential is rejected.

use serde_json::Value;
use verity_core::did::DidResolver;
use verity_status::{Error as StatusError, StatusList, StatusListFetcher, StatusListSubject};
use verity_vdc::{CredentialSubject, VerifiableCredential, decode_vc};

use crate::Result;
use crate::error::invalid;

/// Confirm a revocable credential's bit is not set in its status list.
///
/// A credential is revocable when its `credentialStatus` carries a
/// `statusListIndex`. The status list credential is fetched from
/// `statusListCredential` unless `status_list` is supplied.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` if the credential is revoked or its
/// status cannot be confirmed.
pub async fn assert_not_revoked<P>(
    credential: &VerifiableCredential, provider: &P, status_list: Option<&VerifiableCredential>,
) -> Result<()>
where
    P: DidResolver + StatusListFetcher,
{
    let Some(status) = credential.credential_status.as_ref().filter(|s| s.is_revocable()) else {
        return Ok(());
    };

    let fetched;
    let status_list = match status_list {
        Some(list) => list,
        None => {
            let Some(url) = status.status_list_credential.as_deref() else {
                return Err(StatusError::Unreachable("missing statusListCredential".into()).into());
            };
            fetched = fetch(url, provider).await?;
            &fetched
        }
    };

    let list = status_list
        .credential_subject
        .iter()
        .find_map(list_subject)
        .ok_or_else(|| StatusError::InvalidResponse("missing encodedList".into()))?;
    tracing::debug!(list = list.id.as_deref().unwrap_or_default(), purpose = ?list.status_purpose, "status list read");

    let revoked = status
        .status_list_index
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("missing statusListIndex"))
        .and_then(|idx| idx.value())
        .and_then(|idx| StatusList::decode(&list.encoded_list)?.is_set(idx))
        .map_err(|e| {
            tracing::info!(error = %e, "unable to read status list");
            StatusError::InvalidResponse(e.to_string())
        })?;

    if revoked {
        return Err(invalid!("Credential has been revoked."));
    }
    Ok(())
}

// The status list subject carried by `subject`, if it has an encoded list.
fn list_subject(subject: &CredentialSubject) -> Option<StatusListSubject> {
    let mut claims = subject.claims.clone();
    if let Some(id) = &subject.id {
        claims.insert("id".into(), Value::String(id.clone()));
    }
    serde_json::from_value::<StatusListSubject>(Value::Object(claims))
        .ok()
        .filter(|list| !list.encoded_list.is_empty())
}

async fn fetch<P>(url: &str, provider: &P) -> Result<VerifiableCredential>
where
    P: DidResolver + StatusListFetcher,
{
    let jwt = provider.fetch(url).await.map_err(|e| {
        tracing::warn!(url, error = %e, detail = e.detail(), "status list fetch failed");
        e
    })?;

    decode_vc(jwt.trim(), provider).await.map_err(|e| {
        tracing::warn!(url, error = %e, "status list credential is invalid");
        StatusError::InvalidResponse(e.to_string()).into()
    })
}
