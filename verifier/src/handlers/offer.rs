//! # Verification Offer Handler
//!
//! Presents an existing verification to a holder's wallet.

use anyhow::Context;
use chrono::Duration;
use verity_core::api::{Body, Handler, Request, Response};

use crate::provider::{Configuration, Provider, VerificationStore};
use crate::types::{OfferBody, OfferRequest, VERIFICATION_REQUEST_TYPE, VerificationOffer};
use crate::{Error, Result};

/// How long an offer remains open after the verification is created.
pub const OFFER_VALIDITY: Duration = Duration::days(30);

/// The verification offer for the verification `id`.
///
/// # Errors
///
/// Returns `Error::NotFound` if the verification does not exist.
pub async fn offer(id: &str, provider: &impl Provider) -> Result<VerificationOffer> {
    let Some(verification) =
        VerificationStore::find(provider, id).await.context("issue retrieving verification")?
    else {
        return Err(Error::NotFound(format!("Verification not found for {id}")));
    };
    let config = Configuration::config(provider).await.context("issue loading configuration")?;

    Ok(VerificationOffer {
        id: verification.id,
        type_: VERIFICATION_REQUEST_TYPE.to_string(),
        from: config.verifier_did,
        created_time: verification.offered_at,
        expires_time: verification.offered_at + OFFER_VALIDITY,
        body: OfferBody {
            challenge: verification.challenge,
            presentation_definition: verification.presentation_definition,
        },
    })
}

impl<P: Provider> Handler<VerificationOffer, P> for Request<OfferRequest> {
    type Error = Error;

    async fn handle(self, provider: &P) -> Result<Response<VerificationOffer>> {
        Ok(offer(&self.body.id, provider).await?.into())
    }
}

impl Body for OfferRequest {}
