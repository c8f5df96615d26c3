//! # Submission Handler
//!
//! Verifies a holder's submission and, on success, signs a verification
//! result for the verification's network and records it. A verification
//! accepts one successful submission.

use anyhow::Context;
use http::StatusCode;
use verity_core::api::{Body, Handler, Request, Response};
use verity_vdc::VerifiablePresentation;

use crate::error::invalid;
use crate::provider::{Configuration, Provider, VerificationStore};
use crate::results::{self, SignOptions, Signer};
use crate::types::{
    PresentationDefinition, Status, SubmitRequest, SubmitResponse, Submission, Verification,
};
use crate::{Error, Result, verify};

/// Verify and record a submission for the verification `id`.
///
/// When the submission fails verification, the verification is marked
/// `rejected` (if it has not already completed) and the verification error
/// is returned.
///
/// # Errors
///
/// Returns `Error::NotFound` if the verification does not exist,
/// `Error::InvalidRequest` if the submission fails verification or the
/// verification is already complete, or `Error::ServerError` on an internal
/// failure.
pub async fn submit(id: &str, submission: &str, provider: &impl Provider) -> Result<SubmitResponse> {
    let Some(verification) =
        VerificationStore::find(provider, id).await.context("issue retrieving verification")?
    else {
        return Err(Error::NotFound(format!("Verification not found for {id}")));
    };
    let config = Configuration::config(provider).await.context("issue loading configuration")?;

    let verified = match verify(
        &verification.presentation_definition,
        submission,
        &verification.subject,
        &verification.challenge,
        provider,
    )
    .await
    {
        Ok(verified) => verified,
        Err(e) => {
            if e.is_client_error() {
                reject(&verification, &e, provider).await;
            }
            return Err(e);
        }
    };

    let schema = satisfied_schemas(&verified.presentation, &verification.presentation_definition);
    let options = SignOptions::from_verification(&verification, schema);
    let signer = Signer::from_config(&config)?;
    let signed = results::sign(verification.network, &options, &signer)?;

    let outcome = Submission::approved(
        verified.presentation,
        signed.verification_result.clone(),
        signed.signature.clone(),
    );
    let saved = VerificationStore::save_submission(
        provider,
        &verification.id,
        &outcome,
        config.force_update_completed_verification,
    )
    .await
    .context("issue saving submission")?;
    if !saved {
        return Err(invalid!("Verification already complete"));
    }

    tracing::info!(
        verification_id = %verification.id,
        network = %verification.network,
        subject = %verification.subject,
        "verification approved"
    );

    Ok(SubmitResponse {
        status: Status::Approved,
        verification_result: signed.verification_result,
        signature: signed.signature,
    })
}

// Best effort: a failure to record the rejection must not mask the
// verification error.
async fn reject(verification: &Verification, error: &Error, provider: &impl Provider) {
    let outcome = Submission::rejected(error.message());
    match VerificationStore::save_submission(provider, &verification.id, &outcome, false).await {
        Ok(true) => {
            tracing::info!(verification_id = %verification.id, reason = error.message(), "verification rejected");
        }
        Ok(false) => {
            tracing::debug!(verification_id = %verification.id, "verification already complete, not rejected");
        }
        Err(e) => {
            tracing::warn!(verification_id = %verification.id, error = %e, "issue recording rejection");
        }
    }
}

/// Schema URIs of the descriptors the presentation's submission satisfies,
/// in descriptor map order.
fn satisfied_schemas(
    presentation: &VerifiablePresentation, definition: &PresentationDefinition,
) -> Vec<String> {
    let Some(submission) = &presentation.presentation_submission else {
        return Vec::new();
    };
    submission
        .descriptor_map
        .iter()
        .filter_map(|entry| definition.descriptor(&entry.id))
        .flat_map(|descriptor| descriptor.schema_uris().map(ToString::to_string))
        .collect()
}

impl<P: Provider> Handler<SubmitResponse, P> for Request<SubmitRequest> {
    type Error = Error;

    async fn handle(self, provider: &P) -> Result<Response<SubmitResponse>> {
        let response = submit(&self.body.id, &self.body.submission, provider).await?;
        Ok(Response::with_status(StatusCode::CREATED, response))
    }
}

impl Body for SubmitRequest {}
