//! # API
//!
//! Request and response envelopes shared by the verifier's handlers. A
//! request body is routed to its handler, which returns a response carrying
//! the HTTP status a transport layer should use.

use std::fmt::Debug;
use std::ops::Deref;

use http::StatusCode;

/// A request to process.
#[derive(Clone, Debug)]
pub struct Request<B: Body> {
    /// The request to process.
    pub body: B,
}

impl<B: Body> From<B> for Request<B> {
    fn from(body: B) -> Self {
        Self { body }
    }
}

/// Top-level response data structure common to all handlers.
#[derive(Clone, Debug)]
pub struct Response<T> {
    /// Response HTTP status code.
    pub status: StatusCode,

    /// The endpoint-specific response.
    pub body: T,
}

impl<T> Response<T> {
    /// Create a response with a status other than `200 OK`.
    pub const fn with_status(status: StatusCode, body: T) -> Self {
        Self { status, body }
    }
}

impl<T> From<T> for Response<T> {
    fn from(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

impl<T> Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

/// Request handler.
///
/// Gives requests a common interface so a single entry point can route them
/// to the concrete handler.
pub trait Handler<U, P> {
    /// The error type returned by the handler.
    type Error;

    /// Routes the message to the concrete handler used to process it.
    fn handle(
        self, provider: &P,
    ) -> impl Future<Output = Result<impl Into<Response<U>>, Self::Error>> + Send;
}

/// Restricts the types able to act as a request body. Implemented by all
/// `xxxRequest` types.
pub trait Body: Clone + Debug + Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Ping;
    impl Body for Ping {}

    #[test]
    fn envelopes() {
        let request: Request<Ping> = Ping.into();
        assert!(matches!(request.body, Ping));

        let response: Response<&str> = "pong".into();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(*response, "pong");

        let created = Response::with_status(StatusCode::CREATED, 1);
        assert_eq!(created.status, StatusCode::CREATED);
    }
}
