//! DID document data model.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Kind;
use crate::key::{AccountId, PublicKey, PublicKeyJwk};

/// A DID document, restricted to the properties needed to verify
/// signatures.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// JSON-LD context.
    #[serde(rename = "@context", default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<Value>,

    /// The DID the document describes.
    pub id: String,

    /// Controller(s) of the DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<Value>,

    /// Verification methods declared by the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    /// Authentication relationships, by reference or embedded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<Kind<VerificationMethod>>,

    /// Assertion method relationships, by reference or embedded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<Kind<VerificationMethod>>,
}

impl Document {
    /// All verification methods, including any embedded in verification
    /// relationships.
    #[must_use]
    pub fn methods(&self) -> Vec<&VerificationMethod> {
        let embedded = self
            .authentication
            .iter()
            .chain(&self.assertion_method)
            .filter_map(Kind::as_object);

        let mut methods: Vec<&VerificationMethod> = self.verification_method.iter().collect();
        for vm in embedded {
            if !methods.iter().any(|m| m.id == vm.id) {
                methods.push(vm);
            }
        }
        methods
    }

    /// Find a verification method by (possibly relative) id.
    #[must_use]
    pub fn method(&self, id: &str) -> Option<&VerificationMethod> {
        let fragment = id.rsplit_once('#').map_or(id, |(_, f)| f);
        self.methods().into_iter().find(|m| m.id == id || m.fragment() == Some(fragment))
    }
}

/// A verification method: a public key or account that may sign on behalf
/// of the DID subject.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// DID URL identifying the method.
    pub id: String,

    /// Verification method type.
    #[serde(rename = "type")]
    pub type_: String,

    /// Controller of the method.
    pub controller: String,

    /// Multibase-encoded public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    /// JWK public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<PublicKeyJwk>,

    /// Hex-encoded public key (legacy).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,

    /// CAIP-10 blockchain account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain_account_id: Option<String>,

    /// Legacy Ethereum address property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethereum_address: Option<String>,
}

impl VerificationMethod {
    /// The fragment part of the method id, if any.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.id.rsplit_once('#').map(|(_, f)| f)
    }

    /// Extract the method's public key material.
    ///
    /// # Errors
    ///
    /// Returns an error if the method carries no usable key material.
    pub fn public_key(&self) -> Result<PublicKey> {
        if let Some(encoded) = &self.public_key_multibase {
            return match PublicKey::from_multibase(encoded) {
                Ok(key) => Ok(key),
                // some documents carry raw (un-prefixed) Ed25519 keys
                Err(_) if self.type_.starts_with("Ed25519") => {
                    let (_, bytes) = multibase::decode(encoded)?;
                    let key: [u8; 32] =
                        bytes.try_into().map_err(|_| anyhow!("Ed25519 key must be 32 bytes"))?;
                    Ok(PublicKey::Ed25519(key))
                }
                Err(e) => Err(e),
            };
        }
        if let Some(jwk) = &self.public_key_jwk {
            return PublicKey::try_from(jwk);
        }
        if let Some(hex_key) = &self.public_key_hex {
            let bytes = hex::decode(hex_key)?;
            return if self.type_.starts_with("Ed25519") {
                let key: [u8; 32] =
                    bytes.try_into().map_err(|_| anyhow!("Ed25519 key must be 32 bytes"))?;
                Ok(PublicKey::Ed25519(key))
            } else {
                let vk = k256::ecdsa::VerifyingKey::from_sec1_bytes(&bytes)
                    .map_err(|e| anyhow!("invalid secp256k1 key: {e}"))?;
                Ok(PublicKey::Secp256k1(vk))
            };
        }
        if let Some(account) = &self.blockchain_account_id {
            return Ok(PublicKey::Account(account.parse()?));
        }
        if let Some(address) = &self.ethereum_address {
            return Ok(PublicKey::Account(AccountId {
                namespace: "eip155".to_string(),
                reference: "1".to_string(),
                address: address.clone(),
            }));
        }
        Err(anyhow!("verification method {} has no public key", self.id))
    }
}
