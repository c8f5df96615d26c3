//! # Verification Status Handler

use anyhow::Context;
use http::StatusCode;
use verity_core::api::{Body, Handler, Request, Response};

use crate::provider::{Provider, VerificationStore};
use crate::types::{Status, StatusRequest, StatusResponse};
use crate::{Error, Result};

/// The status of the verification `id`.
///
/// An approved verification carries its signed result. A rejected one
/// carries the rejection reason and is reported with `400 Bad Request`.
///
/// # Errors
///
/// Returns `Error::NotFound` if the verification does not exist.
pub async fn status(id: &str, provider: &impl Provider) -> Result<Response<StatusResponse>> {
    let Some(verification) =
        VerificationStore::find(provider, id).await.context("issue retrieving verification")?
    else {
        return Err(Error::NotFound(format!("Verification not found for {id}")));
    };

    let response = match verification.status {
        Status::Approved => StatusResponse {
            status: Status::Approved,
            verification_result: verification.verification_result,
            signature: verification.signature,
            message: None,
        }
        .into(),
        Status::Rejected => Response::with_status(
            StatusCode::BAD_REQUEST,
            StatusResponse {
                status: Status::Rejected,
                verification_result: None,
                signature: None,
                message: verification.status_detail,
            },
        ),
        Status::Created => StatusResponse {
            status: Status::Created,
            verification_result: None,
            signature: None,
            message: None,
        }
        .into(),
    };
    Ok(response)
}

impl<P: Provider> Handler<StatusResponse, P> for Request<StatusRequest> {
    type Error = Error;

    async fn handle(self, provider: &P) -> Result<Response<StatusResponse>> {
        status(&self.body.id, provider).await
    }
}

impl Body for StatusRequest {}
