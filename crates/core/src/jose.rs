//! # JOSE
//!
//! Compact JWS encoding, decoding, and signature verification for the
//! algorithms used by DID-signed credentials: `EdDSA`, `ES256K`, and
//! `ES256K-R`.
//!
//! Verification resolves the signer's DID document (from the `kid` header
//! or, failing that, the `iss` claim) and accepts the token if any
//! compatible verification method validates the signature.

use std::fmt::{self, Display};
use std::future::Future;

use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::Verifier as _;
use k256::ecdsa::signature::Verifier as _;
use k256::ecdsa::{RecoveryId, VerifyingKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::did::DidResolver;
use crate::key::{PublicKey, ethereum_address};

/// JOSE errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The token is not a well-formed compact JWS.
    #[error("malformed JWT: {0}")]
    Malformed(String),

    /// The token's signer could not be identified or resolved.
    #[error("unable to resolve signer: {0}")]
    Resolution(String),

    /// The signer's DID document has no key usable with the token's
    /// algorithm.
    #[error("no suitable keys found for {0}")]
    NoSuitableKeys(Algorithm),

    /// No key in the signer's DID document validates the signature.
    #[error("invalid signature")]
    InvalidSignature,
}

/// JWS signing algorithms.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    /// Ed25519 signatures.
    EdDSA,

    /// secp256k1 ECDSA over SHA-256.
    ES256K,

    /// secp256k1 ECDSA over SHA-256 with a trailing recovery byte.
    #[serde(rename = "ES256K-R")]
    ES256KR,

    /// Unsecured JWS.
    #[serde(rename = "none")]
    None,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EdDSA => "EdDSA",
            Self::ES256K => "ES256K",
            Self::ES256KR => "ES256K-R",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// JWS protected header.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Header {
    /// Signing algorithm.
    pub alg: Algorithm,

    /// Token type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// DID URL of the signing key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// A decoded JWT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jwt<T> {
    /// Protected header.
    pub header: Header,

    /// Claims payload.
    pub claims: T,
}

/// Produces JWS signatures.
pub trait Signer: Send + Sync {
    /// Algorithm the signer produces.
    fn algorithm(&self) -> Algorithm;

    /// DID URL to place in the `kid` header, if any.
    fn verification_method(&self) -> Option<String>;

    /// Sign `msg`, returning the raw JWS signature bytes.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;
}

/// Encode `claims` as a compact JWS signed by `signer`.
///
/// # Errors
///
/// Returns an error if the claims cannot be serialized or signing fails.
pub async fn encode<T: Serialize + Sync>(claims: &T, signer: &impl Signer) -> anyhow::Result<String> {
    let header = Header {
        alg: signer.algorithm(),
        typ: Some("JWT".to_string()),
        kid: signer.verification_method(),
    };
    let header = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&header)?);
    let payload = Base64UrlUnpadded::encode_string(&serde_json::to_vec(claims)?);
    let signing_input = format!("{header}.{payload}");

    let signature = signer.try_sign(signing_input.as_bytes()).await?;
    Ok(format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&signature)))
}

/// Encode `claims` as an unsecured (`alg: none`) JWT.
///
/// # Errors
///
/// Returns an error if the claims cannot be serialized.
pub fn encode_unsecured<T: Serialize>(claims: &T) -> anyhow::Result<String> {
    let header = Header {
        alg: Algorithm::None,
        typ: Some("JWT".to_string()),
        kid: None,
    };
    let header = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&header)?);
    let payload = Base64UrlUnpadded::encode_string(&serde_json::to_vec(claims)?);
    Ok(format!("{header}.{payload}."))
}

/// Decode a compact JWS without verifying its signature.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the token does not have three parts or
/// the header or payload cannot be decoded.
pub fn decode<T: DeserializeOwned>(token: &str) -> Result<Jwt<T>, Error> {
    let parts = Parts::split(token)?;
    Ok(Jwt {
        header: decode_part(parts.header)?,
        claims: decode_part(parts.payload)?,
    })
}

/// Decode an unsecured (`alg: none`) JWT.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the token is not an unsecured JWT with an
/// empty signature part.
pub fn decode_unsecured<T: DeserializeOwned>(token: &str) -> Result<Jwt<T>, Error> {
    let parts = Parts::split(token)?;
    let header: Header = decode_part(parts.header)?;
    if header.alg != Algorithm::None || !parts.signature.is_empty() {
        return Err(Error::Malformed("not an unsecured JWT".to_string()));
    }
    Ok(Jwt {
        header,
        claims: decode_part(parts.payload)?,
    })
}

/// Decode a compact JWS and verify its signature against the signer's DID
/// document.
///
/// # Errors
///
/// Returns [`Error::Malformed`] for undecodable tokens,
/// [`Error::Resolution`] if the signer cannot be resolved,
/// [`Error::NoSuitableKeys`] when no key matches the algorithm, and
/// [`Error::InvalidSignature`] when no key validates the signature.
pub async fn verify<T: DeserializeOwned>(
    token: &str, resolver: &impl DidResolver,
) -> Result<Jwt<T>, Error> {
    let parts = Parts::split(token)?;
    let header: Header = decode_part(parts.header)?;
    let payload: Value = decode_part(parts.payload)?;

    if header.alg == Algorithm::None {
        return Err(Error::NoSuitableKeys(Algorithm::None));
    }

    let signature = Base64UrlUnpadded::decode_vec(parts.signature)
        .map_err(|e| Error::Malformed(format!("signature: {e}")))?;

    // the signer is identified by `kid` when present, otherwise by `iss`
    let did = match &header.kid {
        Some(kid) if kid.starts_with("did:") => kid.split('#').next().unwrap_or(kid).to_string(),
        _ => payload
            .get("iss")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Resolution("no kid or iss to identify signer".to_string()))?
            .to_string(),
    };
    let document =
        resolver.resolve(&did).await.map_err(|e| Error::Resolution(format!("{did}: {e}")))?;

    let methods = match &header.kid {
        Some(kid) => document.method(kid).into_iter().collect(),
        None => document.methods(),
    };

    let signing_input = format!("{}.{}", parts.header, parts.payload);
    let mut attempted = false;
    for vm in methods {
        let Ok(key) = vm.public_key() else {
            continue;
        };
        match verify_signature(header.alg, &key, signing_input.as_bytes(), &signature) {
            Some(true) => {
                let claims = serde_json::from_value(payload)
                    .map_err(|e| Error::Malformed(format!("claims: {e}")))?;
                return Ok(Jwt { header, claims });
            }
            Some(false) => attempted = true,
            None => {}
        }
    }

    if attempted { Err(Error::InvalidSignature) } else { Err(Error::NoSuitableKeys(header.alg)) }
}

struct Parts<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> Parts<'a> {
    fn split(token: &'a str) -> Result<Self, Error> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        let [header, payload, signature] = parts[..] else {
            return Err(Error::Malformed("expected 3 parts".to_string()));
        };
        Ok(Self {
            header,
            payload,
            signature,
        })
    }
}

fn decode_part<T: DeserializeOwned>(part: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(part.trim_end_matches('='))
        .map_err(|e| Error::Malformed(format!("base64: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Malformed(format!("json: {e}")))
}

// Returns `None` when the key cannot be used with the algorithm.
fn verify_signature(alg: Algorithm, key: &PublicKey, msg: &[u8], sig: &[u8]) -> Option<bool> {
    match (alg, key) {
        (Algorithm::EdDSA, PublicKey::Ed25519(bytes)) => {
            let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(bytes) else {
                return Some(false);
            };
            let Ok(sig) = ed25519_dalek::Signature::from_slice(sig) else {
                return Some(false);
            };
            Some(vk.verify(msg, &sig).is_ok())
        }
        (Algorithm::ES256K, PublicKey::Secp256k1(vk)) => {
            let Some(Ok(sig)) = sig.get(..64).map(k256::ecdsa::Signature::from_slice) else {
                return Some(false);
            };
            let sig = sig.normalize_s().unwrap_or(sig);
            Some(vk.verify(msg, &sig).is_ok())
        }
        (Algorithm::ES256K | Algorithm::ES256KR, PublicKey::Secp256k1(vk)) => {
            Some(recover(msg, sig).iter().any(|recovered| recovered == vk))
        }
        (Algorithm::ES256K | Algorithm::ES256KR, PublicKey::Account(account)) => {
            let recovered = recover(msg, sig);
            Some(recovered.iter().any(|vk| account.matches(&ethereum_address(vk))))
        }
        _ => None,
    }
}

// Recover candidate signing keys from a secp256k1 signature. A trailing
// recovery byte selects the candidate; without one both are tried.
fn recover(msg: &[u8], sig: &[u8]) -> Vec<VerifyingKey> {
    let Some(rs) = sig.get(..64) else {
        return vec![];
    };
    let Ok(signature) = k256::ecdsa::Signature::from_slice(rs) else {
        return vec![];
    };
    let (signature, flipped) = signature.normalize_s().map_or((signature, false), |s| (s, true));

    let candidates: Vec<u8> = match sig.get(64) {
        Some(&v) => vec![if v >= 27 { v - 27 } else { v }],
        None => vec![0, 1],
    };

    let digest = Sha256::digest(msg);
    candidates
        .into_iter()
        .filter_map(|v| {
            let recid = RecoveryId::from_byte(v)?;
            let recid = if flipped {
                RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced())
            } else {
                recid
            };
            VerifyingKey::recover_from_prehash(&digest, &signature, recid).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use ed25519_dalek::Signer as _;
    use serde_json::json;

    use super::*;
    use crate::did::{Document, resolve_offline};

    struct OfflineResolver;

    impl DidResolver for OfflineResolver {
        async fn resolve(&self, did: &str) -> Result<Document> {
            resolve_offline(did)
        }
    }

    struct Ed25519Signer {
        key: ed25519_dalek::SigningKey,
        did: String,
    }

    impl Ed25519Signer {
        fn new() -> Self {
            let key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
            let public = PublicKey::Ed25519(key.verifying_key().to_bytes());
            let did = format!("did:key:{}", public.to_multibase().expect("should encode"));
            Self { key, did }
        }
    }

    impl Signer for Ed25519Signer {
        fn algorithm(&self) -> Algorithm {
            Algorithm::EdDSA
        }

        fn verification_method(&self) -> Option<String> {
            None
        }

        async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
            Ok(self.key.sign(msg).to_bytes().to_vec())
        }
    }

    struct RecoverableSigner {
        key: k256::ecdsa::SigningKey,
    }

    impl Signer for RecoverableSigner {
        fn algorithm(&self) -> Algorithm {
            Algorithm::ES256KR
        }

        fn verification_method(&self) -> Option<String> {
            None
        }

        async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
            let (sig, recid) = self.key.sign_recoverable(msg)?;
            let mut bytes = sig.to_vec();
            bytes.push(recid.to_byte());
            Ok(bytes)
        }
    }

    #[tokio::test]
    async fn eddsa_without_kid() {
        let signer = Ed25519Signer::new();
        let token = encode(&json!({"iss": signer.did, "vp": {}}), &signer)
            .await
            .expect("should encode");

        let jwt: Jwt<Value> = verify(&token, &OfflineResolver).await.expect("should verify");
        assert_eq!(jwt.header.alg, Algorithm::EdDSA);
        assert_eq!(jwt.claims["iss"], signer.did);
    }

    #[tokio::test]
    async fn tampered_payload() {
        let signer = Ed25519Signer::new();
        let token = encode(&json!({"iss": signer.did, "n": 1}), &signer)
            .await
            .expect("should encode");

        let parts: Vec<&str> = token.split('.').collect();
        let forged = Base64UrlUnpadded::encode_string(
            &serde_json::to_vec(&json!({"iss": signer.did, "n": 2})).expect("should serialize"),
        );
        let tampered = format!("{}.{forged}.{}", parts[0], parts[2]);

        let err = verify::<Value>(&tampered, &OfflineResolver).await.expect_err("should fail");
        assert_eq!(err, Error::InvalidSignature);
    }

    #[tokio::test]
    async fn recoverable_did_pkh() {
        let key = k256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        let address = ethereum_address(key.verifying_key());
        let did = format!("did:pkh:eip155:1:{address}");
        let signer = RecoverableSigner { key };

        let token = encode(&json!({"iss": did}), &signer).await.expect("should encode");
        let jwt: Jwt<Value> = verify(&token, &OfflineResolver).await.expect("should verify");
        assert_eq!(jwt.claims["iss"], did);
    }

    #[tokio::test]
    async fn unsecured_rejected() {
        let token = encode_unsecured(&json!({"iss": "did:key:z6Mk"})).expect("should encode");
        let jwt: Jwt<Value> = decode_unsecured(&token).expect("should decode");
        assert_eq!(jwt.header.alg, Algorithm::None);

        assert!(verify::<Value>(&token, &OfflineResolver).await.is_err());
    }

    #[test]
    fn malformed() {
        assert!(matches!(decode::<Value>("not-a-jwt"), Err(Error::Malformed(_))));
    }
}
