//! EIP-712 signed verification results for Ethereum registries.

use ethers::types::transaction::eip712::{Eip712, TypedData};
use serde_json::{Map, Value, json};

use super::{SignOptions, Signer, encode_signature, recover_address};
use crate::error::server;
use crate::types::{SignedResult, VerificationResult};
use crate::Result;

const PRIMARY_TYPE: &str = "VerificationResult";

/// Sign a verification result as EIP-712 typed data.
///
/// The signing domain contains only the `name`, `version`, `chainId` and
/// `verifyingContract` (registry address) values that are set.
///
/// # Errors
///
/// Returns `Error::ServerError` if the typed data cannot be hashed or signed.
pub fn sign(options: &SignOptions, signer: &Signer) -> Result<SignedResult> {
    let verification_result = VerificationResult {
        schema: options.schema.clone(),
        subject: options.subject.clone(),
        expiration: options.expiration(),
        verifier_verification_id: options.verifier_verification_id.clone(),
        ..VerificationResult::default()
    };

    let hash = hash(options, &verification_result)?;
    let signature = signer.sign_hash(hash)?;
    let signature = encode_signature(&signature);

    let recovered = recover_address(&signature, hash)?;
    tracing::debug!(signer = %signer.address(), %recovered, "signed ethereum verification result");

    Ok(SignedResult { verification_result, signature })
}

/// Recover the address that signed `signed` under the domain in `options`.
///
/// # Errors
///
/// Returns `Error::ServerError` if the signature is malformed.
pub fn recover(options: &SignOptions, signed: &SignedResult) -> Result<String> {
    let hash = hash(options, &signed.verification_result)?;
    recover_address(&signed.signature, hash)
}

fn hash(options: &SignOptions, result: &VerificationResult) -> Result<[u8; 32]> {
    let typed_data = typed_data(options, result)?;
    typed_data.encode_eip712().map_err(|e| server!("issue hashing typed data: {e}"))
}

fn typed_data(options: &SignOptions, result: &VerificationResult) -> Result<TypedData> {
    let mut domain_type = Vec::new();
    let mut domain = Map::new();

    if let Some(name) = options.name.as_deref().filter(|s| !s.is_empty()) {
        domain_type.push(json!({"name": "name", "type": "string"}));
        domain.insert("name".into(), json!(name));
    }
    if let Some(version) = options.version.as_deref().filter(|s| !s.is_empty()) {
        domain_type.push(json!({"name": "version", "type": "string"}));
        domain.insert("version".into(), json!(version));
    }
    if let Some(chain_id) = options.chain_id.filter(|id| *id > 0) {
        domain_type.push(json!({"name": "chainId", "type": "uint256"}));
        domain.insert("chainId".into(), json!(chain_id));
    }
    if let Some(registry) = options.registry_address.as_deref().filter(|s| !s.is_empty()) {
        domain_type.push(json!({"name": "verifyingContract", "type": "address"}));
        domain.insert("verifyingContract".into(), json!(registry));
    }

    let typed_data = json!({
        "types": {
            "EIP712Domain": domain_type,
            "VerificationResult": [
                {"name": "schema", "type": "string[]"},
                {"name": "subject", "type": "address"},
                {"name": "expiration", "type": "uint256"},
                {"name": "verifier_verification_id", "type": "string"}
            ]
        },
        "primaryType": PRIMARY_TYPE,
        "domain": Value::Object(domain),
        "message": {
            "schema": result.schema,
            "subject": result.subject,
            "expiration": result.expiration,
            "verifier_verification_id": result.verifier_verification_id
        }
    });

    serde_json::from_value(typed_data).map_err(|e| server!("issue building typed data: {e}"))
}
