//! # Status List Provider

use std::future::Future;

use crate::Error;

/// `StatusListFetcher` retrieves status list credentials.
pub trait StatusListFetcher: Send + Sync {
    /// Fetch the status list credential (a VC-JWT) published at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, Error>> + Send;
}
