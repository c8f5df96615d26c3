//! # Generate
//!
//! Generate the presentation definition and challenge for a new
//! verification.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::json;

use crate::types::{
    Algorithms, Constraints, Directive, Field, Format, InputDescriptor, IsHolder, Predicate,
    PresentationDefinition, SchemaRef, StatusDirective, Statuses,
};

/// Input descriptor id for KYB/AML attestations.
pub const KYBPAML_INPUT: &str = "kybpaml_input";

/// Input descriptor id for accredited investor attestations.
pub const ACCINV_INPUT: &str = "accinv_input";

/// Credential type required by [`KYBPAML_INPUT`].
pub const KYBPAML_ATTESTATION: &str = "KYBPAMLAttestation";

/// Credential type required by [`ACCINV_INPUT`].
pub const ENTITY_ACCINV_ATTESTATION: &str = "EntityAccInvAttestation";

/// Schema URI of KYB/AML attestations.
pub const KYBPAML_SCHEMA: &str =
    "https://verite.id/definitions/processes/kycaml/0.0.1/generic--usa-legal_person";

/// Schema URI of accredited investor attestations.
pub const ENTITY_ACCINV_SCHEMA: &str = "https://raw.githubusercontent.com/centrehq/verite/d1b97b3a475aa00cf894f72213f34b7bcb8b3435/packages/docs/static/definitions/processes/kycaml/0.0.1/generic--usa-entity-accinv-all-checks";

const ALGORITHMS: [&str; 2] = ["EdDSA", "ES256K"];
const APPROVAL_DATE_PATTERN: &str =
    "^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}.[0-9]{3}Z$";
const CHALLENGE_LEN: usize = 32;

/// The credential type an input descriptor requires.
#[must_use]
pub fn credential_type(descriptor_id: &str) -> Option<&'static str> {
    match descriptor_id {
        KYBPAML_INPUT => Some(KYBPAML_ATTESTATION),
        ACCINV_INPUT => Some(ENTITY_ACCINV_ATTESTATION),
        _ => None,
    }
}

/// Build the presentation definition offered for a new verification. The
/// definition accepts a KYB/AML attestation and an accredited investor
/// attestation. When `trusted_issuers` is set, issuers must match it.
#[must_use]
pub fn presentation_definition(trusted_issuers: Option<&str>) -> PresentationDefinition {
    let algorithms = || Some(Algorithms { alg: ALGORITHMS.map(String::from).to_vec() });

    PresentationDefinition {
        id: uuid::Uuid::new_v4().to_string(),
        format: Format {
            jwt: algorithms(),
            jwt_vc: algorithms(),
            jwt_vp: algorithms(),
        },
        input_descriptors: vec![
            InputDescriptor {
                id: KYBPAML_INPUT.to_string(),
                name: Some("Proof of KYBP".to_string()),
                purpose: Some("Please provide a valid credential from a KYBP/AML issuer".to_string()),
                schema: vec![SchemaRef { uri: KYBPAML_SCHEMA.to_string(), required: Some(true) }],
                constraints: Some(constraints(
                    trusted_issuers,
                    KYBPAML_ATTESTATION,
                    "The process used for KYBP/AML.",
                    "The date upon which this KYBP/AML Attestation was issued.",
                )),
                group: None,
            },
            InputDescriptor {
                id: ACCINV_INPUT.to_string(),
                name: Some("Proof of Accredited Investor from Circle".to_string()),
                purpose: Some(
                    "Please provide a valid credential from a Accredited Investor".to_string(),
                ),
                schema: vec![SchemaRef {
                    uri: ENTITY_ACCINV_SCHEMA.to_string(),
                    required: Some(true),
                }],
                constraints: Some(constraints(
                    trusted_issuers,
                    ENTITY_ACCINV_ATTESTATION,
                    "The process used for analysing Accredited Investor.",
                    "The date upon which this Accredited Investor Attestation was issued.",
                )),
                group: None,
            },
        ],
        name: None,
        purpose: None,
    }
}

fn constraints(
    trusted_issuers: Option<&str>, attestation: &str, process_purpose: &str, date_purpose: &str,
) -> Constraints {
    let issuer = Field {
        path: ["$.issuer.id", "$.issuer", "$.vc.issuer", "$.iss"].map(String::from).to_vec(),
        purpose: Some("The issuer of the credential must be trusted".to_string()),
        predicate: Some(Predicate::Required),
        filter: trusted_issuers.map(|pattern| json!({"type": "string", "pattern": pattern})),
        id: None,
    };
    let process = Field {
        path: attestation_paths(attestation, "process"),
        purpose: Some(process_purpose.to_string()),
        filter: Some(json!({"type": "string"})),
        ..Field::default()
    };
    let approval_date = Field {
        path: attestation_paths(attestation, "approvalDate"),
        purpose: Some(date_purpose.to_string()),
        filter: Some(json!({"type": "string", "pattern": APPROVAL_DATE_PATTERN})),
        ..Field::default()
    };

    Constraints {
        statuses: Some(Statuses {
            active: Some(StatusDirective { directive: Directive::Required }),
            revoked: Some(StatusDirective { directive: Directive::Disallowed }),
            suspended: None,
        }),
        is_holder: Some(vec![IsHolder {
            field_id: vec!["subjectId".to_string()],
            directive: Predicate::Required,
        }]),
        fields: Some(vec![issuer, process, approval_date]),
    }
}

fn attestation_paths(attestation: &str, field: &str) -> Vec<String> {
    vec![
        format!("$.credentialSubject.{attestation}.{field}"),
        format!("$.vc.credentialSubject.{attestation}.{field}"),
        format!("$.{attestation}.{field}"),
    ]
}

/// Generate a random challenge for binding a submission to a verification.
#[must_use]
pub fn challenge() -> String {
    let bytes: [u8; CHALLENGE_LEN] = rand::random();
    Base64UrlUnpadded::encode_string(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition() {
        let pd = presentation_definition(None);
        assert!(uuid::Uuid::parse_str(&pd.id).is_ok());
        assert_eq!(pd.input_descriptors.len(), 2);
        assert_eq!(
            pd.format.jwt_vp.as_ref().map(|f| f.alg.clone()),
            Some(vec!["EdDSA".to_string(), "ES256K".to_string()])
        );

        let kyb = pd.descriptor(KYBPAML_INPUT).expect("should have descriptor");
        assert_eq!(kyb.schema_uris().collect::<Vec<_>>(), vec![KYBPAML_SCHEMA]);
        let fields = kyb.constraints.as_ref().and_then(|c| c.fields.as_ref()).expect("fields");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].filter, None);
        assert_eq!(fields[1].path[0], "$.credentialSubject.KYBPAMLAttestation.process");

        // each definition is unique
        assert_ne!(pd.id, presentation_definition(None).id);
    }

    #[test]
    fn trusted_issuers() {
        let pd = presentation_definition(Some("^did:key:z6Mk"));
        let accinv = pd.descriptor(ACCINV_INPUT).expect("should have descriptor");
        let fields = accinv.constraints.as_ref().and_then(|c| c.fields.as_ref()).expect("fields");
        assert_eq!(fields[0].filter, Some(json!({"type": "string", "pattern": "^did:key:z6Mk"})));
    }

    #[test]
    fn credential_types() {
        assert_eq!(credential_type(KYBPAML_INPUT), Some(KYBPAML_ATTESTATION));
        assert_eq!(credential_type(ACCINV_INPUT), Some(ENTITY_ACCINV_ATTESTATION));
        assert_eq!(credential_type("other"), None);
    }

    #[test]
    fn challenges() {
        let one = challenge();
        assert_eq!(one.len(), 43);
        assert_ne!(one, challenge());
    }
}
