//! # Attestation Schemas
//!
//! JSON Schemas (draft-07) for the attestation types the verifier accepts,
//! keyed by the schema URIs used in presentation definitions.

use serde_json::{Value, json};

use crate::generate::{ENTITY_ACCINV_SCHEMA, KYBPAML_SCHEMA};

/// The schema registered for `uri`.
#[must_use]
pub fn find(uri: &str) -> Option<Value> {
    match uri {
        KYBPAML_SCHEMA => Some(attestation_schema("KYBPAMLAttestation")),
        ENTITY_ACCINV_SCHEMA => Some(attestation_schema("EntityAccInvAttestation")),
        _ => None,
    }
}

fn attestation_schema(type_: &str) -> Value {
    json!({
        "$ref": format!("#/definitions/{type_}"),
        "$schema": "http://json-schema.org/draft-07/schema#",
        "definitions": {
            type_: {
                "additionalProperties": false,
                "properties": {
                    "type": {"const": type_, "type": "string"},
                    "process": {"type": "string"},
                    "approvalDate": {"type": "string"}
                },
                "required": ["type", "process", "approvalDate"],
                "type": "object"
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry() {
        let schema = find(KYBPAML_SCHEMA).expect("should be registered");
        assert_eq!(schema["$ref"], json!("#/definitions/KYBPAMLAttestation"));
        assert!(schema["definitions"]["KYBPAMLAttestation"].is_object());

        let schema = find(ENTITY_ACCINV_SCHEMA).expect("should be registered");
        assert_eq!(
            schema["definitions"]["EntityAccInvAttestation"]["properties"]["type"]["const"],
            json!("EntityAccInvAttestation")
        );

        assert!(find("https://example.com/unknown").is_none());
    }

    #[test]
    fn compiles() {
        let schema = find(KYBPAML_SCHEMA).expect("should be registered");
        let validator = jsonschema::draft7::new(&schema).expect("should compile");
        assert!(validator.is_valid(&json!({
            "type": "KYBPAMLAttestation",
            "process": "https://verite.id/definitions/processes/kycaml/0.0.1/generic--usa-legal_person",
            "approvalDate": "2022-01-06T18:09:47.000Z"
        })));
        assert!(!validator.is_valid(&json!({"type": "KYBPAMLAttestation"})));
        assert!(!validator.is_valid(&json!({
            "type": "EntityAccInvAttestation",
            "process": "p",
            "approvalDate": "d"
        })));
    }
}
