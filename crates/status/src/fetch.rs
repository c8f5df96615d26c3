//! # Status List Fetcher
//!
//! HTTP retrieval of status list credentials. Hosts listed in the internal
//! domain map are rewritten to their internal address and fetched with a
//! client that tolerates internal certificates and allows a longer timeout.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Url};

use crate::{Error, StatusListFetcher};

/// Default timeout for externally hosted status lists.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for internally hosted status lists.
pub const DEFAULT_INTERNAL_TIMEOUT: Duration = Duration::from_secs(90);

/// Maps public status list hosts to internal hosts.
///
/// Parsed from `public.example.com=issuer.internal,other.example.com=x`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainMap(HashMap<String, String>);

impl DomainMap {
    /// The internal host for `host`, if mapped.
    #[must_use]
    pub fn get(&self, host: &str) -> Option<&str> {
        self.0.get(host).map(String::as_str)
    }

    /// Returns `true` if no hosts are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for DomainMap {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut map = HashMap::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((public, internal)) = entry.split_once('=') else {
                tracing::warn!(entry, "ignoring status list domain map entry without '='");
                continue;
            };
            map.insert(public.trim().to_string(), internal.trim().to_string());
        }
        Ok(Self(map))
    }
}

/// Configuration for [`StatusListClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Public hosts to fetch from internal addresses.
    pub internal_domains: DomainMap,

    /// Timeout for external requests.
    pub timeout: Duration,

    /// Timeout for internal requests.
    pub internal_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            internal_domains: DomainMap::default(),
            timeout: DEFAULT_TIMEOUT,
            internal_timeout: DEFAULT_INTERNAL_TIMEOUT,
        }
    }
}

/// Fetches status list credentials over HTTP(S).
#[derive(Clone, Debug)]
pub struct StatusListClient {
    external: Client,
    internal: Client,
    domains: DomainMap,
}

impl StatusListClient {
    /// Build the external and internal HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let external = Client::builder()
            .timeout(config.timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;
        let internal = Client::builder()
            .timeout(config.internal_timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            external,
            internal,
            domains: config.internal_domains.clone(),
        })
    }

    /// Resolve the URL to fetch and whether to use the internal client.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` cannot be parsed or rewritten.
    pub fn target(&self, url: &str) -> Result<(Url, bool)> {
        let mut url = Url::parse(url)?;
        let Some(host) = host_with_port(&url) else {
            return Ok((url, false));
        };
        let Some(internal) = self.domains.get(&host) else {
            return Ok((url, false));
        };

        match internal.split_once(':') {
            Some((host, port)) => {
                url.set_host(Some(host))?;
                url.set_port(port.parse().ok()).map_err(|()| anyhow::anyhow!("invalid port"))?;
            }
            None => {
                url.set_host(Some(internal))?;
            }
        }
        Ok((url, true))
    }
}

// the host as written in the URL, including any explicit port
fn host_with_port(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(url.port().map_or_else(|| host.to_string(), |port| format!("{host}:{port}")))
}

impl StatusListFetcher for StatusListClient {
    async fn fetch(&self, url: &str) -> Result<String, Error> {
        let (target, internal) =
            self.target(url).map_err(|e| Error::Unreachable(format!("{url}: {e}")))?;
        let client = if internal { &self.internal } else { &self.external };

        let response = client.get(target.clone()).send().await.map_err(|e| {
            tracing::info!(url = %target, error = %e, "failed to fetch status list credential");
            Error::Unreachable(format!("{target}: {e}"))
        })?;

        if !response.status().is_success() {
            tracing::info!(url = %target, status = %response.status(), "status list url returned an error");
            return Err(Error::InvalidResponse(format!("{target}: {}", response.status())));
        }

        response.text().await.map_err(|e| Error::InvalidResponse(format!("{target}: {e}")))
    }
}
