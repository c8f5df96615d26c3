//! # Test Identities
//!
//! Key holders that sign VC-JWTs and VP-JWTs, and an offline DID resolver
//! for the DIDs they use.

use anyhow::Result;
use chrono::Utc;
use ed25519_dalek::Signer as _;
use k256::ecdsa::signature::Signer as _;
use serde_json::{Value, json};
use verity_core::did::{self, DidResolver, Document};
use verity_core::jose::{self, Algorithm, Signer};
use verity_core::key::{PublicKey, ethereum_address};
use verity_status::{STATUS_LIST_CREDENTIAL_TYPE, StatusList};

/// Resolves `did:key` and `did:pkh` DIDs without network access.
#[derive(Clone, Copy, Debug, Default)]
pub struct Resolver;

impl DidResolver for Resolver {
    async fn resolve(&self, did: &str) -> Result<Document> {
        did::resolve_offline(did)
    }
}

#[derive(Clone)]
enum Key {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
    Ethereum(k256::ecdsa::SigningKey),
}

/// A key holder with a DID. Acts as issuer or holder in tests.
#[derive(Clone)]
pub struct Holder {
    key: Key,
    did: String,
}

impl Holder {
    /// A `did:key` Ed25519 holder signing with `EdDSA`.
    #[must_use]
    pub fn ed25519() -> Self {
        let key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let public = PublicKey::Ed25519(key.verifying_key().to_bytes());
        let did = format!("did:key:{}", public.to_multibase().expect("should encode"));
        Self { key: Key::Ed25519(key), did }
    }

    /// A `did:key` secp256k1 holder signing with `ES256K`.
    #[must_use]
    pub fn secp256k1() -> Self {
        let key = k256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        let public = PublicKey::Secp256k1(key.verifying_key().clone());
        let did = format!("did:key:{}", public.to_multibase().expect("should encode"));
        Self { key: Key::Secp256k1(key), did }
    }

    /// A `did:pkh:eip155:1` holder signing with `ES256K-R`.
    #[must_use]
    pub fn ethereum() -> Self {
        let key = k256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        let did = format!("did:pkh:eip155:1:{}", ethereum_address(key.verifying_key()));
        Self { key: Key::Ethereum(key), did }
    }

    /// The holder's DID.
    #[must_use]
    pub fn did(&self) -> &str {
        &self.did
    }

    /// The holder's Ethereum address, for `did:pkh` holders.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.did.strip_prefix("did:pkh:eip155:1:")
    }

    /// Sign `claims` as a compact JWS. `iss` defaults to the holder's DID.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded.
    pub async fn sign(&self, claims: &Value) -> Result<String> {
        self.sign_as(claims, &self.did).await
    }

    /// Sign `claims` with the holder's key while claiming to be `did`.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded.
    pub async fn sign_as(&self, claims: &Value, did: &str) -> Result<String> {
        let mut claims = claims.clone();
        if let Some(map) = claims.as_object_mut() {
            map.entry("iss").or_insert_with(|| json!(did));
        }
        jose::encode(&claims, self).await
    }

    /// Issue a `StatusList2021Credential` published at `url`, with the bits
    /// at `revoked` set.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be encoded or signed.
    pub async fn status_list(&self, url: &str, revoked: &[usize]) -> Result<String> {
        let encoded = StatusList::from_indexes(revoked).encode()?;
        let claims = json!({
            "nbf": Utc::now().timestamp(),
            "vc": {
                "@context": [
                    "https://www.w3.org/2018/credentials/v1",
                    "https://w3id.org/vc/status-list/2021/v1"
                ],
                "id": url,
                "type": ["VerifiableCredential", STATUS_LIST_CREDENTIAL_TYPE],
                "credentialSubject": {
                    "id": format!("{url}#list"),
                    "type": "StatusList2021",
                    "statusPurpose": "revocation",
                    "encodedList": encoded
                }
            }
        });
        self.sign(&claims).await
    }
}

impl Signer for Holder {
    fn algorithm(&self) -> Algorithm {
        match self.key {
            Key::Ed25519(_) => Algorithm::EdDSA,
            Key::Secp256k1(_) => Algorithm::ES256K,
            Key::Ethereum(_) => Algorithm::ES256KR,
        }
    }

    fn verification_method(&self) -> Option<String> {
        None
    }

    async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        match &self.key {
            Key::Ed25519(key) => Ok(key.sign(msg).to_bytes().to_vec()),
            Key::Secp256k1(key) => {
                let signature: k256::ecdsa::Signature = key.sign(msg);
                Ok(signature.to_bytes().to_vec())
            }
            Key::Ethereum(key) => {
                let (signature, recid) = key.sign_recoverable(msg)?;
                let mut bytes = signature.to_bytes().to_vec();
                bytes.push(recid.to_byte());
                Ok(bytes)
            }
        }
    }
}
