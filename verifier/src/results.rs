//! # Verification Results
//!
//! Builds and signs the verification result for the verification's network.
//! Both networks produce a 65-byte secp256k1 signature, `r‖s‖v` with
//! `v = 27 + recovery id`, hex-encoded with a `0x` prefix.

pub mod ethereum;
pub mod solana;

use chrono::{DateTime, Duration, Utc};
use ethers::signers::{LocalWallet, Signer as _};
use ethers::types::{H256, Signature};

use crate::config::Config;
use crate::error::server;
use crate::types::{Network, SignedResult, Verification};
use crate::Result;

/// The well-known development key. Reachable only when
/// [`Config::allow_default_signer`] is set.
pub const DEFAULT_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// How long a verification result is valid for, unless an expiration is
/// given.
pub const RESULT_VALIDITY: Duration = Duration::days(7);

/// The default expiration of a verification result.
#[must_use]
pub fn default_expiration() -> DateTime<Utc> {
    Utc::now() + RESULT_VALIDITY
}

/// Inputs to a verification result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// The verified address.
    pub subject: String,

    /// Chain id. For Solana, the numeric form of the cluster.
    pub chain_id: Option<u64>,

    /// Signing domain name.
    pub name: Option<String>,

    /// Signing domain version.
    pub version: Option<String>,

    /// Registry contract address (Ethereum).
    pub registry_address: Option<String>,

    /// Result expiry. Defaults to [`default_expiration`].
    pub expiration: Option<DateTime<Utc>>,

    /// The verification id.
    pub verifier_verification_id: String,

    /// Schema URIs of the satisfied descriptors.
    pub schema: Vec<String>,
}

impl SignOptions {
    /// Options for a verification's result.
    #[must_use]
    pub fn from_verification(verification: &Verification, schema: Vec<String>) -> Self {
        Self {
            subject: verification.subject.clone(),
            chain_id: verification.chain_id,
            name: verification.name.clone(),
            version: verification.version.clone(),
            registry_address: verification.registry_address.clone(),
            expiration: None,
            verifier_verification_id: verification.id.clone(),
            schema,
        }
    }

    fn expiration(&self) -> i64 {
        self.expiration.unwrap_or_else(default_expiration).timestamp()
    }
}

/// Sign a verification result for `network`.
///
/// # Errors
///
/// Returns an error if the result cannot be encoded or signed.
pub fn sign(network: Network, options: &SignOptions, signer: &Signer) -> Result<SignedResult> {
    match network {
        Network::Ethereum => ethereum::sign(options, signer),
        Network::Solana => solana::sign(options, signer),
    }
}

/// A secp256k1 key used to sign verification results.
#[derive(Clone, Debug)]
pub struct Signer {
    wallet: LocalWallet,
}

impl Signer {
    /// A signer for a hex-encoded private key, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerError` if the key is not a valid secp256k1 key.
    pub fn new(private_key: &str) -> Result<Self> {
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| server!("invalid verifier private key: {e}"))?;
        Ok(Self { wallet })
    }

    /// The configured signer. Falls back to [`DEFAULT_PRIVATE_KEY`] only
    /// when the configuration allows it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ServerError` if no usable key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.verifier_private_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => Self::new(key),
            None if config.allow_default_signer => {
                tracing::warn!("no verifier private key configured, signing with the default key");
                Self::new(DEFAULT_PRIVATE_KEY)
            }
            None => {
                tracing::error!("no verifier private key configured");
                Err(server!("no verifier private key configured"))
            }
        }
    }

    /// The signer's lowercase `0x`-prefixed address.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{:#x}", self.wallet.address())
    }

    fn sign_hash(&self, hash: [u8; 32]) -> Result<Signature> {
        self.wallet.sign_hash(H256::from(hash)).map_err(|e| server!("signing failed: {e}"))
    }
}

fn encode_signature(signature: &Signature) -> String {
    format!("0x{}", hex::encode(signature.to_vec()))
}

fn recover_address(signature: &str, hash: [u8; 32]) -> Result<String> {
    let signature: Signature =
        signature.parse().map_err(|e| server!("invalid signature: {e}"))?;
    let address =
        signature.recover(H256::from(hash)).map_err(|e| server!("recovery failed: {e}"))?;
    Ok(format!("{address:#x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_signer() {
        let config = Config::default();
        let err = Signer::from_config(&config).expect_err("no key");
        assert_eq!(err.message(), "Internal server error");

        let config = Config { allow_default_signer: true, ..Config::default() };
        let signer = Signer::from_config(&config).expect("default key");
        assert_eq!(signer.address(), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");

        let config = Config {
            verifier_private_key: Some(
                "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d".to_string(),
            ),
            ..Config::default()
        };
        let signer = Signer::from_config(&config).expect("configured key");
        assert_eq!(signer.address(), "0x70997970c51812dc3a010c7d01b50e0d17dc79c8");

        assert!(Signer::new("not-a-key").is_err());
    }

    #[test]
    fn expiration() {
        let options = SignOptions::default();
        let expected = (Utc::now() + RESULT_VALIDITY).timestamp();
        assert!((options.expiration() - expected).abs() <= 1);
    }
}
