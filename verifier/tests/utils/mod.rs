//! Credential and presentation factories shared by the integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use test_utils::Holder;
use verity_verifier::generate::{
    ENTITY_ACCINV_ATTESTATION, ENTITY_ACCINV_SCHEMA, KYBPAML_ATTESTATION, KYBPAML_SCHEMA,
};

pub const STATUS_URL: &str = "https://issuer.example.com/status/1";
pub const APPROVAL_DATE: &str = "2022-01-06T18:09:47.000Z";
pub const ISSUED_AT: i64 = 1_641_492_587;

/// Claims for a KYB/AML attestation about `subject`.
pub fn kyb_claims(subject: &str) -> Value {
    attestation_claims(subject, KYBPAML_ATTESTATION, KYBPAML_SCHEMA)
}

/// Claims for an accredited investor attestation about `subject`.
pub fn accinv_claims(subject: &str) -> Value {
    attestation_claims(subject, ENTITY_ACCINV_ATTESTATION, ENTITY_ACCINV_SCHEMA)
}

fn attestation_claims(subject: &str, attestation: &str, process: &str) -> Value {
    json!({
        "sub": subject,
        "nbf": ISSUED_AT,
        "vc": {
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential", attestation],
            "credentialSubject": {
                attestation: {
                    "type": attestation,
                    "process": process,
                    "approvalDate": APPROVAL_DATE
                }
            }
        }
    })
}

/// Make the credential revocable at `index` in the list at [`STATUS_URL`].
pub fn with_status(mut claims: Value, index: usize) -> Value {
    claims["vc"]["credentialStatus"] = json!({
        "id": format!("{STATUS_URL}#{index}"),
        "type": "StatusList2021Entry",
        "statusPurpose": "revocation",
        "statusListIndex": index.to_string(),
        "statusListCredential": STATUS_URL
    });
    claims
}

/// Claims for a presentation of `credentials`, each mapped to its input
/// descriptor id.
pub fn presentation_claims(holder: &str, challenge: &str, credentials: &[(&str, String)]) -> Value {
    let descriptor_map: Vec<Value> = credentials
        .iter()
        .enumerate()
        .map(|(i, (id, _))| {
            json!({"id": id, "format": "jwt_vc", "path": format!("$.verifiableCredential[{i}]")})
        })
        .collect();
    let jwts: Vec<&str> = credentials.iter().map(|(_, jwt)| jwt.as_str()).collect();

    json!({
        "iss": holder,
        "nonce": challenge,
        "vp": {
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiablePresentation"],
            "holder": holder,
            "verifiableCredential": jwts,
            "presentation_submission": {
                "id": "b4f1c8c1-6e3b-4f2f-8d3c-3a1c3c1a1a1a",
                "definition_id": "definition",
                "descriptor_map": descriptor_map
            }
        }
    })
}

/// A signed presentation by `holder` of `credentials`.
pub async fn submission(holder: &Holder, challenge: &str, credentials: &[(&str, String)]) -> String {
    let claims = presentation_claims(holder.did(), challenge, credentials);
    holder.sign(&claims).await.expect("should sign presentation")
}
