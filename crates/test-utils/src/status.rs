//! # Status List Server
//!
//! Serves status list credentials from memory, keyed by URL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use verity_status::{Error, StatusListFetcher};

/// Status list credentials, or the failure to return, keyed by URL.
#[derive(Clone, Debug, Default)]
pub struct StatusLists {
    lists: Arc<Mutex<HashMap<String, Result<String, Error>>>>,
}

impl StatusLists {
    /// Publish `jwt` at `url`.
    pub fn insert(&self, url: &str, jwt: String) {
        self.lists.lock().expect("should lock").insert(url.to_string(), Ok(jwt));
    }

    /// Fail fetches of `url` with `error`.
    pub fn fail(&self, url: &str, error: Error) {
        self.lists.lock().expect("should lock").insert(url.to_string(), Err(error));
    }
}

impl StatusListFetcher for StatusLists {
    async fn fetch(&self, url: &str) -> Result<String, Error> {
        let lists = self.lists.lock().expect("should lock");
        lists
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(Error::InvalidResponse(format!("404 Not Found: {url}"))))
    }
}
