//! # Public Keys
//!
//! Public key material extracted from DID document verification methods.
//! Keys arrive as multibase strings (`publicKeyMultibase`), JWKs
//! (`publicKeyJwk`), or blockchain account identifiers
//! (`blockchainAccountId`), and are normalized to [`PublicKey`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{Result, anyhow, bail};
use base64ct::{Base64UrlUnpadded, Encoding};
use ethers::utils::keccak256;
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Multicodec prefix for Ed25519 public keys.
pub const ED25519_CODEC: [u8; 2] = [0xed, 0x01];

/// Multicodec prefix for compressed secp256k1 public keys.
pub const SECP256K1_CODEC: [u8; 2] = [0xe7, 0x01];

static CAIP10_ACCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-a-z0-9]{3,8}):([-_a-zA-Z0-9]{1,32}):([-.%a-zA-Z0-9]{1,128})$")
        .expect("should compile")
});

/// Public key material usable for signature verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    /// Raw Ed25519 public key.
    Ed25519([u8; 32]),

    /// secp256k1 public key.
    Secp256k1(VerifyingKey),

    /// Blockchain account the signer must recover to.
    Account(AccountId),
}

impl PublicKey {
    /// Decode a multicodec-prefixed, multibase-encoded public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not valid multibase or the key codec
    /// is not supported.
    pub fn from_multibase(value: &str) -> Result<Self> {
        let (_, bytes) = multibase::decode(value).map_err(|e| anyhow!("invalid multibase key: {e}"))?;
        Self::from_multicodec(&bytes)
    }

    /// Decode a multicodec-prefixed public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key codec is not supported or the key bytes
    /// are malformed.
    pub fn from_multicodec(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            bail!("key too short");
        }
        let (codec, key) = bytes.split_at(2);
        match [codec[0], codec[1]] {
            ED25519_CODEC => {
                let key: [u8; 32] =
                    key.try_into().map_err(|_| anyhow!("Ed25519 key must be 32 bytes"))?;
                Ok(Self::Ed25519(key))
            }
            SECP256K1_CODEC => {
                let vk = VerifyingKey::from_sec1_bytes(key)
                    .map_err(|e| anyhow!("invalid secp256k1 key: {e}"))?;
                Ok(Self::Secp256k1(vk))
            }
            _ => Err(anyhow!("unsupported key codec {}", hex::encode(codec))),
        }
    }

    /// Encode the key as a multicodec-prefixed, base58btc multibase string.
    ///
    /// # Errors
    ///
    /// Returns an error for account-based keys, which have no byte encoding.
    pub fn to_multibase(&self) -> Result<String> {
        let bytes = match self {
            Self::Ed25519(key) => [ED25519_CODEC.as_slice(), key.as_slice()].concat(),
            Self::Secp256k1(vk) => {
                let point = vk.to_encoded_point(true);
                [SECP256K1_CODEC.as_slice(), point.as_bytes()].concat()
            }
            Self::Account(_) => bail!("account keys cannot be multibase encoded"),
        };
        Ok(multibase::encode(multibase::Base::Base58Btc, bytes))
    }
}

/// A JSON Web Key as found in a verification method's `publicKeyJwk`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PublicKeyJwk {
    /// Key type: `OKP` or `EC`.
    pub kty: String,

    /// Curve: `Ed25519` or `secp256k1`.
    pub crv: String,

    /// Base64url-encoded x coordinate (or the full key for `OKP`).
    pub x: String,

    /// Base64url-encoded y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl TryFrom<&PublicKeyJwk> for PublicKey {
    type Error = anyhow::Error;

    fn try_from(jwk: &PublicKeyJwk) -> Result<Self> {
        let x = Base64UrlUnpadded::decode_vec(&jwk.x).map_err(|e| anyhow!("invalid JWK x: {e}"))?;

        match (jwk.kty.as_str(), jwk.crv.as_str()) {
            ("OKP", "Ed25519") => {
                let key: [u8; 32] =
                    x.try_into().map_err(|_| anyhow!("Ed25519 key must be 32 bytes"))?;
                Ok(Self::Ed25519(key))
            }
            ("EC", "secp256k1") => {
                let Some(y) = &jwk.y else {
                    bail!("secp256k1 JWK is missing y");
                };
                let y = Base64UrlUnpadded::decode_vec(y).map_err(|e| anyhow!("invalid JWK y: {e}"))?;
                let sec1 = [&[0x04_u8][..], x.as_slice(), y.as_slice()].concat();
                let vk = VerifyingKey::from_sec1_bytes(&sec1)
                    .map_err(|e| anyhow!("invalid secp256k1 key: {e}"))?;
                Ok(Self::Secp256k1(vk))
            }
            (kty, crv) => Err(anyhow!("unsupported JWK {kty}/{crv}")),
        }
    }
}

/// A CAIP-10 blockchain account identifier, e.g.
/// `eip155:1:0xab16a96d359ec26a11e2c2b3d8f8b8942d5bfcdb`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountId {
    /// Chain namespace, e.g. `eip155` or `solana`.
    pub namespace: String,

    /// Chain reference within the namespace.
    pub reference: String,

    /// Account address.
    pub address: String,
}

impl AccountId {
    /// Returns `true` when the account is a well-formed Ethereum address.
    #[must_use]
    pub fn is_ethereum(&self) -> bool {
        self.namespace == "eip155" && is_ethereum_address(&self.address)
    }

    /// Returns `true` when `address` refers to this account, ignoring case
    /// for Ethereum addresses.
    #[must_use]
    pub fn matches(&self, address: &str) -> bool {
        if self.namespace == "eip155" {
            self.address.eq_ignore_ascii_case(address)
        } else {
            self.address == address
        }
    }
}

impl FromStr for AccountId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some(caps) = CAIP10_ACCOUNT.captures(s) else {
            bail!("invalid CAIP-10 account id: {s}");
        };
        Ok(Self {
            namespace: caps[1].to_string(),
            reference: caps[2].to_string(),
            address: caps[3].to_string(),
        })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.reference, self.address)
    }
}

/// Returns `true` when `address` is a `0x`-prefixed, 20-byte hex address.
#[must_use]
pub fn is_ethereum_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Derive the lowercase `0x`-prefixed Ethereum address for a secp256k1 key.
#[must_use]
pub fn ethereum_address(vk: &VerifyingKey) -> String {
    let point = vk.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}
