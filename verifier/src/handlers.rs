//! # Endpoint
//!
//! `handle` provides the entry point for the verifier API. Requests are
//! routed to the appropriate handler for processing, returning a response
//! carrying the HTTP status a transport layer should use.

mod create;
mod offer;
mod status;
mod submit;

use std::fmt::Debug;

use tracing::instrument;
pub use verity_core::api::{Body, Handler, Request, Response};

pub use self::create::create_verification;
pub use self::offer::offer;
pub use self::status::status;
pub use self::submit::submit;
use crate::Result;
pub use crate::error::Error;
use crate::provider::Provider;

/// Handle incoming verifier requests.
///
/// # Errors
///
/// This method can fail for a number of reasons related to the incoming
/// request's viability. Expected failures include unknown verifications,
/// invalid request content, and submissions that fail verification.
///
/// Implementers should look to the Error type and description for more
/// information on the reason for failure.
#[instrument(level = "debug", skip(provider))]
pub async fn handle<B, P, U>(request: impl Into<Request<B>> + Debug, provider: &P) -> Result<Response<U>>
where
    B: Body,
    P: Provider,
    Request<B>: Handler<U, P, Error = Error>,
{
    let request: Request<B> = request.into();
    Ok(request.handle(provider).await?.into())
}
