//! # Verification Result
//!
//! The chain-specific record signed by the verifier and consumed by
//! on-chain registries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::invalid;

/// A verification result. The core fields are signed for every network;
/// `name`, `version` and `cluster` are set only when they contribute to the
/// signed message.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct VerificationResult {
    /// Schema URIs of the descriptors the submission satisfied.
    pub schema: Vec<String>,

    /// The verified address.
    pub subject: String,

    /// Expiry of the result, in seconds since the Unix epoch.
    pub expiration: i64,

    /// The verification id.
    pub verifier_verification_id: String,

    /// Domain name (Solana).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Domain version (Solana).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Cluster the result is valid on (Solana).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Cluster>,
}

/// A verification result with the verifier's signature.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignedResult {
    /// The signed result.
    pub verification_result: VerificationResult,

    /// `0x`-prefixed, 65-byte signature.
    pub signature: String,
}

/// Solana clusters, with the numeric chain ids used to store them.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    /// `mainnet-beta` (1).
    MainnetBeta,

    /// `devnet` (2).
    Devnet,

    /// `testnet` (3).
    Testnet,

    /// `localnet` (1337).
    Localnet,
}

impl Cluster {
    /// The cluster for a stored chain id.
    #[must_use]
    pub const fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            1 => Some(Self::MainnetBeta),
            2 => Some(Self::Devnet),
            3 => Some(Self::Testnet),
            1337 => Some(Self::Localnet),
            _ => None,
        }
    }

    /// The chain id the cluster is stored as.
    #[must_use]
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::MainnetBeta => 1,
            Self::Devnet => 2,
            Self::Testnet => 3,
            Self::Localnet => 1337,
        }
    }

    /// The cluster's name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::Localnet => "localnet",
        }
    }
}

impl FromStr for Cluster {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" => Ok(Self::MainnetBeta),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "localnet" => Ok(Self::Localnet),
            _ => Err(invalid!("Invalid chainId")),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
