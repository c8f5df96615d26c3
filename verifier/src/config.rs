//! # Configuration
//!
//! Verifier settings, read from the environment:
//!
//! | Variable                              | Setting                                   |
//! |---------------------------------------|-------------------------------------------|
//! | `STATUS_LIST_INTERNAL_DOMAIN_MAP`     | `host=internal-host,...` status list hosts |
//! | `STATUS_LIST_TIMEOUT_SECS`            | external status list timeout              |
//! | `STATUS_LIST_INTERNAL_TIMEOUT_SECS`   | internal status list timeout              |
//! | `FORCE_UPDATE_COMPLETED_VERIFICATION` | `true` allows overwriting submissions     |
//! | `VERIFIER_PRIVATE_KEY`                | hex secp256k1 result signing key          |
//! | `ALLOW_DEFAULT_SIGNER`                | `true` enables the development key        |
//! | `TRUSTED_ISSUERS`                     | issuer pattern for new definitions        |
//! | `VERIFIER_DID`                        | DID named in verification offers          |

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use verity_status::{ClientConfig, DEFAULT_INTERNAL_TIMEOUT, DEFAULT_TIMEOUT, DomainMap};

/// Verifier configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Status list hosts to fetch through the internal client, as
    /// `public-host=internal-host` pairs separated by commas.
    pub status_list_internal_domain_map: Option<String>,

    /// Timeout, in seconds, for external status list fetches.
    pub status_list_timeout_secs: Option<u64>,

    /// Timeout, in seconds, for internal status list fetches.
    pub status_list_internal_timeout_secs: Option<u64>,

    /// Allow a completed verification's submission to be overwritten. For
    /// load testing only.
    pub force_update_completed_verification: bool,

    /// Hex-encoded secp256k1 key used to sign verification results.
    #[serde(skip_serializing)]
    pub verifier_private_key: Option<String>,

    /// Sign with the well-known development key when no private key is
    /// configured. Never enable outside development.
    pub allow_default_signer: bool,

    /// Pattern trusted issuer DIDs must match.
    pub trusted_issuers: Option<String>,

    /// The verifier's DID, named in verification offers.
    pub verifier_did: Option<String>,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Read the configuration from `(name, value)` pairs. Unknown names are
    /// ignored and empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric setting cannot be parsed.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (name, value) in vars {
            let value: String = value.into();
            if value.trim().is_empty() {
                continue;
            }
            match name.as_ref() {
                "STATUS_LIST_INTERNAL_DOMAIN_MAP" => {
                    config.status_list_internal_domain_map = Some(value);
                }
                "STATUS_LIST_TIMEOUT_SECS" => {
                    config.status_list_timeout_secs =
                        Some(value.trim().parse().context("invalid STATUS_LIST_TIMEOUT_SECS")?);
                }
                "STATUS_LIST_INTERNAL_TIMEOUT_SECS" => {
                    config.status_list_internal_timeout_secs = Some(
                        value.trim().parse().context("invalid STATUS_LIST_INTERNAL_TIMEOUT_SECS")?,
                    );
                }
                "FORCE_UPDATE_COMPLETED_VERIFICATION" => {
                    config.force_update_completed_verification = is_true(&value);
                }
                "VERIFIER_PRIVATE_KEY" => config.verifier_private_key = Some(value),
                "ALLOW_DEFAULT_SIGNER" => config.allow_default_signer = is_true(&value),
                "TRUSTED_ISSUERS" => config.trusted_issuers = Some(value),
                "VERIFIER_DID" => config.verifier_did = Some(value),
                _ => {}
            }
        }
        Ok(config)
    }

    /// Settings for the status list HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain map cannot be parsed.
    pub fn status_list_client(&self) -> Result<ClientConfig> {
        let internal_domains = match &self.status_list_internal_domain_map {
            Some(map) => map.parse::<DomainMap>()?,
            None => DomainMap::default(),
        };
        Ok(ClientConfig {
            internal_domains,
            timeout: self.status_list_timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            internal_timeout: self
                .status_list_internal_timeout_secs
                .map_or(DEFAULT_INTERNAL_TIMEOUT, Duration::from_secs),
        })
    }
}

fn is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
