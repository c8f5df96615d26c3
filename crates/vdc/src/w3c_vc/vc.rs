//! # Verifiable Credentials Data Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use verity_core::{Kind, OneMany};
use verity_status::StatusListEntry;

use crate::w3c_vc::proof::Proof;

/// The base context every credential and presentation must list first.
pub const BASE_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// `VerifiableCredential` represents a naive implementation of the W3C
/// Verifiable Credential data model v1.1.
/// See <https://www.w3.org/TR/vc-data-model>.
///
/// Members not modelled explicitly are kept in `extra` so that path queries
/// over the serialized credential see the whole document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifiableCredential {
    /// The @context property is used to map property URIs into short-form
    /// aliases. It is an ordered set where the first item is "`https://www.w3.org/2018/credentials/v1`".
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// The id property is OPTIONAL. If present, id property's value MUST be a
    /// single URL, which MAY be dereferenceable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The type property is used to determine whether or not a provided
    /// verifiable credential is appropriate for the intended use-case.
    #[serde(rename = "type")]
    pub type_: OneMany<String>,

    /// A URI or object with an id property.
    pub issuer: Kind<Issuer>,

    /// A set of objects containing claims about credential subjects(s).
    pub credential_subject: OneMany<CredentialSubject>,

    /// An XMLSCHEMA11-2 (RFC3339) date-time the credential was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<DateTime<Utc>>,

    /// An XMLSCHEMA11-2 (RFC3339) date-time the credential ceases to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    /// Used to determine the status of the credential, such as whether it is
    /// revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<StatusListEntry>,

    /// Schemas the credential claims to conform to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_schema: Option<OneMany<CredentialSchema>>,

    /// The credential's proof. For JWT credentials this is a
    /// `JwtProof2020` carrying the original token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,

    /// Members not otherwise modelled.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerifiableCredential {
    /// The issuer's identifier.
    #[must_use]
    pub fn issuer_id(&self) -> &str {
        match &self.issuer {
            Kind::String(id) => id,
            Kind::Object(issuer) => &issuer.id,
        }
    }

    /// The first credential subject's identifier, if any.
    #[must_use]
    pub fn subject_id(&self) -> Option<&str> {
        self.credential_subject.iter().find_map(|s| s.id.as_deref())
    }

    /// Returns `true` if the credential lists `type_` among its types.
    #[must_use]
    pub fn has_type(&self, type_: &str) -> bool {
        self.type_.iter().any(|t| t == type_)
    }

    /// The JWT the credential was decoded from, if any.
    #[must_use]
    pub fn jwt(&self) -> Option<&str> {
        self.proof.as_ref().and_then(|p| p.jwt.as_deref())
    }

    /// Check the credential has the members the data model requires.
    ///
    /// # Errors
    ///
    /// Returns a description of the first missing or malformed member.
    pub fn validate(&self) -> Result<(), String> {
        validate_context(&self.context)?;
        if !self.has_type("VerifiableCredential") {
            return Err("type is missing default \"VerifiableCredential\"".to_string());
        }
        if self.issuer_id().is_empty() {
            return Err("issuer is missing".to_string());
        }
        if self.credential_subject.is_empty()
            || self.credential_subject.iter().all(CredentialSubject::is_empty)
        {
            return Err("credentialSubject is missing".to_string());
        }
        if self.issuance_date.is_none() {
            return Err("issuanceDate is missing".to_string());
        }
        Ok(())
    }
}

pub(crate) fn validate_context(context: &[Kind<Value>]) -> Result<(), String> {
    match context.first() {
        Some(Kind::String(first)) if first == BASE_CONTEXT => Ok(()),
        _ => Err(format!("@context is missing default context \"{BASE_CONTEXT}\"")),
    }
}

/// Issuer identifies the issuer of the credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Issuer {
    /// The issuer URI.
    pub id: String,

    /// Issuer-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `CredentialSubject` holds claims about the subject(s) referenced by the
/// credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialSubject {
    /// A URI that uniquely identifies the subject of the claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Claims about the subject, keyed by attestation type for attestation
    /// credentials (e.g. `KYBPAMLAttestation`).
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl CredentialSubject {
    /// Returns `true` when the subject has neither an id nor claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.claims.is_empty()
    }
}

/// `CredentialSchema` identifies a schema the credential conforms to.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialSchema {
    /// A URI identifying the schema file.
    pub id: String,

    /// Schema validator type, e.g. "`JsonSchemaValidator2018`".
    #[serde(rename = "type")]
    pub type_: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential", "KYBPAMLAttestation"],
            "issuer": {"id": "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"},
            "issuanceDate": "2022-01-06T18:09:47.000Z",
            "credentialSubject": {
                "id": "did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "KYBPAMLAttestation": {
                    "type": "KYBPAMLAttestation",
                    "process": "https://verite.id/definitions/processes/kycaml/0.0.1/generic--usa-legal_person",
                    "approvalDate": "2022-01-06T18:09:47.000Z"
                }
            },
            "credentialStatus": {
                "id": "https://example.com/revocation/1#94567",
                "type": "StatusList2021Entry",
                "statusListIndex": "94567",
                "statusListCredential": "https://example.com/revocation/1"
            },
            "evidence": [{"type": "KYBProcess"}]
        })
    }

    #[test]
    fn model() {
        let vc: VerifiableCredential =
            serde_json::from_value(sample()).expect("should deserialize");
        assert!(vc.validate().is_ok());
        assert!(vc.has_type("KYBPAMLAttestation"));
        assert_eq!(vc.issuer_id(), "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK");
        assert_eq!(
            vc.subject_id(),
            Some("did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
        assert!(vc.credential_status.as_ref().is_some_and(StatusListEntry::is_revocable));

        // unmodelled members survive
        let value = serde_json::to_value(&vc).expect("should serialize");
        assert_eq!(value["evidence"], json!([{"type": "KYBProcess"}]));
        assert_eq!(
            value["credentialSubject"]["KYBPAMLAttestation"]["type"],
            json!("KYBPAMLAttestation")
        );
    }

    #[test]
    fn missing_context() {
        let mut value = sample();
        value["@context"] = json!(["https://example.com/other"]);
        let vc: VerifiableCredential = serde_json::from_value(value).expect("should deserialize");
        assert!(vc.validate().is_err_and(|e| e.starts_with("@context")));
    }
}
