//! # Verification
//!
//! Verifies a holder's submission: the presentation envelope and challenge,
//! each presented credential, and the submission's conformance to the
//! presentation definition.

use tracing::instrument;
use verity_core::did::DidResolver;
use verity_status::StatusListFetcher;
use verity_vdc::{VerifiableCredential, VerifiablePresentation, decode_vc, verify_vp};

use crate::constraints::assert_valid_submission;
use crate::error::invalid;
use crate::types::PresentationDefinition;
use crate::{Result, checks};

/// A submission that passed verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verified {
    /// The decoded presentation.
    pub presentation: VerifiablePresentation,
}

/// Verify a VP-JWT submission for the verification with the given
/// `definition`, `subject` address and `challenge`.
///
/// Credentials are checked in order and the first failure is returned: the
/// credential's signature, its expiry, its subject, then its revocation
/// status. The submission is then validated against the definition.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` describing the first failed check, or
/// `Error::ServerError` on an internal failure.
#[instrument(level = "debug", skip(definition, submission, provider), fields(verification_id = %definition.id))]
pub async fn verify<P>(
    definition: &PresentationDefinition, submission: &str, subject: &str, challenge: &str,
    provider: &P,
) -> Result<Verified>
where
    P: DidResolver + StatusListFetcher,
{
    let presentation = verify_vp(submission.trim(), Some(challenge))?;
    tracing::info!(verification_id = %definition.id, "VP verified");

    let credentials = presentation.credentials();
    if credentials.is_empty() {
        return Err(invalid!("No Verifiable Credential provided"));
    }

    for credential in credentials {
        check_credential(credential, subject, provider).await.inspect_err(|e| {
            tracing::info!(
                verification_id = %definition.id,
                credential_id = credential.id.as_deref().unwrap_or_default(),
                credential_type = ?credential.type_.iter().collect::<Vec<_>>(),
                issuer = credential.issuer_id(),
                error = %e,
                "credential rejected"
            );
        })?;
    }

    assert_valid_submission(&presentation, definition)?;
    tracing::debug!(verification_id = %definition.id, "VC schema verified");
    tracing::info!(verification_id = %definition.id, "VC verified");

    Ok(Verified { presentation })
}

async fn check_credential<P>(credential: &VerifiableCredential, subject: &str, provider: &P) -> Result<()>
where
    P: DidResolver + StatusListFetcher,
{
    let Some(jwt) = credential.jwt() else {
        return Err(invalid!("Input isn't a valid Verifiable Credential. Missing JWT proof."));
    };
    decode_vc(jwt, provider).await?;
    tracing::debug!("VC signature verified");

    checks::assert_not_expired(credential)?;
    tracing::debug!("VC expiration verified");

    checks::assert_subject_matches(subject, credential.subject_id(), provider).await?;
    tracing::debug!("VC subject verified");

    checks::assert_not_revoked(credential, provider, None).await?;
    tracing::debug!("VC revocation status verified");

    Ok(())
}
