//! # JWT Claims
//!
//! Normalizes VC-JWT and VP-JWT payloads into the W3C data model. The
//! registered JWT claims are merged into the `vc`/`vp` claim:
//!
//! | JWT claim | credential            | presentation      |
//! |-----------|-----------------------|-------------------|
//! | `iss`     | `issuer` (`.id`)      | `holder`          |
//! | `sub`     | `credentialSubject.id`|                   |
//! | `jti`     | `id`                  | `id`              |
//! | `nbf`     | `issuanceDate`        | `issuanceDate`    |
//! | `exp`     | `expirationDate`      | `expirationDate`  |
//! | `nonce`   |                       | `proof.challenge` |
//!
//! Any other top-level claim (e.g. `presentation_submission`) is copied to
//! the document if the document does not already define it.

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Value};
use verity_core::jose;

use crate::w3c_vc::proof::Proof;
use crate::w3c_vc::vc::VerifiableCredential;
use crate::w3c_vc::vp::VerifiablePresentation;

const REGISTERED: [&str; 8] = ["iss", "sub", "aud", "jti", "nbf", "iat", "exp", "nonce"];

/// Normalize a decoded VC-JWT payload.
///
/// # Errors
///
/// Returns a description of the problem if the payload has no `vc` object
/// or does not deserialize as a credential.
pub fn normalize_credential(
    jwt: &str, mut claims: Map<String, Value>,
) -> Result<VerifiableCredential, String> {
    let Some(Value::Object(mut vc)) = claims.remove("vc") else {
        return Err("JWT payload is missing a vc object".to_string());
    };

    if let Some(Value::String(iss)) = claims.get("iss") {
        match vc.get_mut("issuer") {
            Some(Value::Object(issuer)) => {
                issuer.insert("id".to_string(), Value::String(iss.clone()));
            }
            _ => {
                vc.insert("issuer".to_string(), Value::String(iss.clone()));
            }
        }
    }

    if let Some(Value::String(sub)) = claims.get("sub") {
        match vc.get_mut("credentialSubject") {
            Some(Value::Object(subject)) => {
                subject.insert("id".to_string(), Value::String(sub.clone()));
            }
            Some(Value::Array(subjects)) => {
                if let Some(Value::Object(subject)) = subjects.first_mut() {
                    subject.insert("id".to_string(), Value::String(sub.clone()));
                }
            }
            _ => {}
        }
    }

    merge_common(&mut vc, &claims);
    vc.insert("proof".to_string(), proof_value(Proof::jwt(jwt)));

    serde_json::from_value(Value::Object(vc)).map_err(|e| format!("invalid credential: {e}"))
}

/// Normalize a decoded VP-JWT payload. Embedded credential JWTs are decoded,
/// without signature verification, and normalized.
///
/// # Errors
///
/// Returns a description of the problem if the payload has no `vp` object,
/// an embedded credential cannot be decoded, or the result does not
/// deserialize as a presentation.
pub fn normalize_presentation(
    jwt: &str, mut claims: Map<String, Value>,
) -> Result<VerifiablePresentation, String> {
    let Some(Value::Object(mut vp)) = claims.remove("vp") else {
        return Err("JWT payload is missing a vp object".to_string());
    };

    if let Some(Value::String(iss)) = claims.get("iss") {
        vp.insert("holder".to_string(), Value::String(iss.clone()));
    }

    let credentials = match vp.remove("verifiableCredential") {
        None | Some(Value::Null) => vec![],
        Some(Value::Array(items)) => items,
        Some(item) => vec![item],
    };
    let mut normalized = Vec::with_capacity(credentials.len());
    for item in credentials {
        let vc = match item {
            Value::String(vc_jwt) => {
                let decoded: jose::Jwt<Map<String, Value>> = jose::decode(&vc_jwt)
                    .map_err(|e| format!("invalid embedded credential: {e}"))?;
                normalize_credential(&vc_jwt, decoded.claims)?
            }
            Value::Object(_) => serde_json::from_value(item)
                .map_err(|e| format!("invalid embedded credential: {e}"))?,
            _ => return Err("verifiableCredential entries must be JWTs or objects".to_string()),
        };
        normalized.push(vc);
    }
    if !normalized.is_empty() {
        let values = serde_json::to_value(normalized).map_err(|e| e.to_string())?;
        vp.insert("verifiableCredential".to_string(), values);
    }

    merge_common(&mut vp, &claims);

    let mut proof = Proof::jwt(jwt);
    proof.challenge = claims.get("nonce").and_then(Value::as_str).map(ToString::to_string);
    vp.insert("proof".to_string(), proof_value(proof));

    serde_json::from_value(Value::Object(vp)).map_err(|e| format!("invalid presentation: {e}"))
}

// `jti`, `nbf`, `exp` and unregistered claims
fn merge_common(doc: &mut Map<String, Value>, claims: &Map<String, Value>) {
    if let Some(Value::String(jti)) = claims.get("jti") {
        doc.insert("id".to_string(), Value::String(jti.clone()));
    }
    if let Some(date) = claims.get("nbf").and_then(Value::as_i64).and_then(to_date) {
        doc.insert("issuanceDate".to_string(), Value::String(date));
    } else if let Some(date) = claims.get("iat").and_then(Value::as_i64).and_then(to_date) {
        doc.entry("issuanceDate").or_insert(Value::String(date));
    }
    if let Some(date) = claims.get("exp").and_then(Value::as_i64).and_then(to_date) {
        doc.insert("expirationDate".to_string(), Value::String(date));
    }

    for (key, value) in claims {
        if !REGISTERED.contains(&key.as_str()) {
            doc.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

fn to_date(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn proof_value(proof: Proof) -> Value {
    serde_json::to_value(proof).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn as_map(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else { panic!("should be an object") };
        map
    }

    #[test]
    fn credential_claims() {
        let claims = as_map(json!({
            "iss": "did:key:z6MkIssuer",
            "sub": "did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "jti": "urn:uuid:1",
            "nbf": 1_641_492_587,
            "exp": 1_641_492_588,
            "vc": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiableCredential"],
                "credentialSubject": {"KYBPAMLAttestation": {"type": "KYBPAMLAttestation"}}
            }
        }));
        let vc = normalize_credential("a.b.c", claims).expect("should normalize");

        assert_eq!(vc.issuer_id(), "did:key:z6MkIssuer");
        assert_eq!(
            vc.subject_id(),
            Some("did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
        assert_eq!(vc.id.as_deref(), Some("urn:uuid:1"));
        assert_eq!(
            vc.issuance_date.map(|d| d.timestamp()),
            Some(1_641_492_587)
        );
        assert_eq!(vc.expiration_date.map(|d| d.timestamp()), Some(1_641_492_588));
        assert_eq!(vc.jwt(), Some("a.b.c"));
        assert!(vc.validate().is_ok());
    }

    #[test]
    fn presentation_claims() {
        let vc_jwt = jose::encode_unsecured(&json!({
            "iss": "did:key:z6MkIssuer",
            "sub": "did:key:z6MkHolder",
            "nbf": 1_641_492_587,
            "vc": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiableCredential"],
                "credentialSubject": {"name": "x"}
            }
        }))
        .expect("should encode");

        let claims = as_map(json!({
            "iss": "did:key:z6MkHolder",
            "nonce": "challenge-1",
            "vp": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiablePresentation"],
                "verifiableCredential": [vc_jwt]
            },
            "presentation_submission": {
                "id": "s1",
                "definition_id": "d1",
                "descriptor_map": [{"id": "kybpaml_input", "format": "jwt_vc", "path": "$.verifiableCredential[0]"}]
            }
        }));
        let vp = normalize_presentation("x.y.z", claims).expect("should normalize");

        assert_eq!(vp.holder.as_deref(), Some("did:key:z6MkHolder"));
        assert_eq!(vp.challenge(), Some("challenge-1"));
        assert_eq!(vp.credentials().len(), 1);
        assert_eq!(vp.credentials()[0].jwt(), Some(vc_jwt.as_str()));
        assert_eq!(vp.credentials()[0].subject_id(), Some("did:key:z6MkHolder"));
        let submission = vp.presentation_submission.expect("should have submission");
        assert_eq!(submission.descriptor_map[0].id, "kybpaml_input");
    }

    #[test]
    fn missing_vp() {
        let claims = as_map(json!({"iss": "did:key:z6MkHolder"}));
        assert!(normalize_presentation("x.y.z", claims).is_err());
    }
}
