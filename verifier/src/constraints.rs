//! # Submission Constraints
//!
//! Validates a presentation's submission against the presentation definition
//! it responds to.
//!
//! Only descriptors the submission references are evaluated: a submission
//! that omits a descriptor is not rejected for it.

use jsonschema::Validator;
use serde_json::Value;
use tracing::instrument;
use verity_vdc::VerifiablePresentation;

use crate::error::{invalid, server};
use crate::types::{Field, InputDescriptor, Predicate, PresentationDefinition};
use crate::{Result, generate, jsonpath, schemas};

/// Confirm that every credential the submission maps to a descriptor
/// conforms to that descriptor's schemas and field constraints.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` naming the first failed constraint, and
/// `Error::ServerError` if the definition names a descriptor without a
/// registered credential type.
#[instrument(level = "debug", skip_all, fields(definition_id = %definition.id))]
pub fn assert_valid_submission(
    presentation: &VerifiablePresentation, definition: &PresentationDefinition,
) -> Result<()> {
    let descriptor_map = presentation
        .presentation_submission
        .as_ref()
        .map(|s| s.descriptor_map.as_slice())
        .unwrap_or_default();

    let unrecognized: Vec<&str> = descriptor_map
        .iter()
        .filter(|m| definition.descriptor(&m.id).is_none())
        .map(|m| m.id.as_str())
        .collect();
    if !unrecognized.is_empty() {
        let ids = serde_json::to_string(&unrecognized).map_err(|e| server!("{e}"))?;
        return Err(invalid!("Encountered unrecognized subjects: {ids}"));
    }

    let document = serde_json::to_value(presentation).map_err(|e| server!("{e}"))?;

    for descriptor in &definition.input_descriptors {
        let Some(mapping) = descriptor_map.iter().find(|m| m.id == descriptor.id) else {
            continue;
        };

        let credentials = jsonpath::query(&document, &mapping.path)
            .map_err(|e| invalid!("Invalid descriptor path: {e}"))?;
        if credentials.is_empty() {
            let name = descriptor.name.as_deref().unwrap_or(&descriptor.id);
            return Err(invalid!("No credentials satisfy input descriptor: {name}"));
        }

        validate_descriptor(descriptor, &credentials)?;
    }

    Ok(())
}

fn validate_descriptor(descriptor: &InputDescriptor, credentials: &[&Value]) -> Result<()> {
    let Some(credential_type) = generate::credential_type(&descriptor.id) else {
        tracing::error!(
            descriptor_id = %descriptor.id,
            "input descriptor is offered but has no registered credential type"
        );
        return Err(server!("no credential type registered for {}", descriptor.id));
    };

    let Some(fields) =
        descriptor.constraints.as_ref().and_then(|c| c.fields.as_ref()).filter(|f| !f.is_empty())
    else {
        return Ok(());
    };

    let mut uris: Vec<&str> = vec![];
    for uri in descriptor.schema_uris() {
        if !uris.contains(&uri) {
            uris.push(uri);
        }
    }
    let mut validators = vec![];
    for uri in uris {
        let Some(schema) = schemas::find(uri) else {
            return Err(invalid!("Unknown schema: {uri}"));
        };
        let validator = jsonschema::draft7::new(&schema).map_err(|e| {
            tracing::error!(uri, error = %e, "attestation schema does not compile");
            invalid!("Schema is invalid")
        })?;
        validators.push(validator);
    }
    let filters = fields
        .iter()
        .map(|field| field.filter.as_ref().map(compile_filter).transpose())
        .collect::<Result<Vec<_>>>()?;

    for credential in credentials {
        if !has_type(credential, credential_type) {
            return Err(invalid!(
                "Submission claims having descriptorId {} but the matching type {credential_type} does not exist in the credential",
                descriptor.id
            ));
        }
        for validator in &validators {
            assert_adheres_to_schema(credential, validator, credential_type)?;
        }
        for (field, filter) in fields.iter().zip(&filters) {
            assert_satisfies_field(credential, field, filter.as_ref())?;
        }
    }

    Ok(())
}

fn has_type(credential: &Value, credential_type: &str) -> bool {
    match &credential["type"] {
        Value::Array(types) => types.iter().any(|t| t.as_str() == Some(credential_type)),
        Value::String(t) => t == credential_type,
        _ => false,
    }
}

fn attestation<'a>(credential: &'a Value, credential_type: &str) -> Option<&'a Value> {
    let found = match &credential["credentialSubject"] {
        Value::Object(subject) => subject.get(credential_type),
        Value::Array(subjects) => subjects.iter().find_map(|s| s.get(credential_type)),
        _ => None,
    };
    found.filter(|v| is_truthy(v))
}

fn assert_adheres_to_schema(
    credential: &Value, validator: &Validator, credential_type: &str,
) -> Result<()> {
    let Some(attestation) = attestation(credential, credential_type) else {
        return Err(invalid!("No attestation of type {credential_type} present in credential"));
    };

    if let Some(error) = validator.iter_errors(attestation).next() {
        let path = error.instance_path.to_string();
        let path = if path.is_empty() { "input".to_string() } else { path };
        return Err(invalid!("Credential does not adhere to schema: {path} {error}"));
    }
    Ok(())
}

fn compile_filter(filter: &Value) -> Result<Validator> {
    jsonschema::draft7::new(filter).map_err(|e| {
        tracing::error!(error = %e, "field filter does not compile");
        server!("invalid field filter: {e}")
    })
}

fn assert_satisfies_field(
    credential: &Value, field: &Field, filter: Option<&Validator>,
) -> Result<()> {
    let value = jsonpath::first(credential, &field.path)
        .map_err(|e| server!("invalid field path: {e}"))?
        .filter(|v| is_truthy(v));

    let Some(value) = value else {
        if field.predicate == Some(Predicate::Preferred) {
            return Ok(());
        }
        let name = field.purpose.as_deref().or(field.id.as_deref()).unwrap_or_default();
        return Err(invalid!("Credential is missing required field: {name}"));
    };

    let Some(filter) = filter else {
        return Ok(());
    };
    if !filter.is_valid(value) {
        let purpose = field.purpose.as_deref().unwrap_or_default();
        return Err(invalid!("Credential did not satisfy required constraint: {purpose}"));
    }
    Ok(())
}

// a present value is one JavaScript would not treat as falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::generate::{
        ACCINV_INPUT, KYBPAML_ATTESTATION, KYBPAML_INPUT, KYBPAML_SCHEMA, presentation_definition,
    };

    const ISSUER: &str = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";

    fn credential() -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential", "KYBPAMLAttestation"],
            "issuer": {"id": ISSUER},
            "issuanceDate": "2022-01-06T18:09:47.000Z",
            "credentialSubject": {
                "id": "did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "KYBPAMLAttestation": {
                    "type": "KYBPAMLAttestation",
                    "process": KYBPAML_SCHEMA,
                    "approvalDate": "2022-01-06T18:09:47.000Z"
                }
            }
        })
    }

    fn presentation(credential: Value, descriptor_id: &str) -> VerifiablePresentation {
        serde_json::from_value(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiablePresentation"],
            "verifiableCredential": [credential],
            "presentation_submission": {
                "id": "b4f1c8c1-6e3b-4f2f-8d3c-3a1c3c1a1a1a",
                "definition_id": "c62af7a4-82d5-42be-bd93-df12955e9a4e",
                "descriptor_map": [{
                    "id": descriptor_id,
                    "format": "jwt_vc",
                    "path": "$.verifiableCredential[0]"
                }]
            }
        }))
        .expect("should deserialize")
    }

    fn message(result: Result<()>) -> String {
        result.expect_err("should fail").message().to_string()
    }

    #[test]
    fn valid_submission() {
        let pd = presentation_definition(Some("^did:key:"));
        let vp = presentation(credential(), KYBPAML_INPUT);
        assert!(assert_valid_submission(&vp, &pd).is_ok());
    }

    #[test]
    fn unrecognized_subjects() {
        let pd = presentation_definition(None);
        let vp = presentation(credential(), "other_input");
        assert_eq!(
            message(assert_valid_submission(&vp, &pd)),
            r#"Encountered unrecognized subjects: ["other_input"]"#
        );
    }

    #[test]
    fn partial_submission() {
        // the accredited investor descriptor is not referenced, so it is
        // never evaluated
        let pd = presentation_definition(None);
        let vp = presentation(credential(), KYBPAML_INPUT);
        assert!(pd.descriptor(ACCINV_INPUT).is_some());
        assert!(assert_valid_submission(&vp, &pd).is_ok());

        // an empty submission passes
        let mut vp = vp;
        vp.presentation_submission = None;
        assert!(assert_valid_submission(&vp, &pd).is_ok());
    }

    #[test]
    fn no_matching_credential() {
        let pd = presentation_definition(None);
        let mut vp = presentation(credential(), KYBPAML_INPUT);
        if let Some(submission) = vp.presentation_submission.as_mut() {
            submission.descriptor_map[0].path = "$.verifiableCredential[3]".to_string();
        }
        assert_eq!(
            message(assert_valid_submission(&vp, &pd)),
            "No credentials satisfy input descriptor: Proof of KYBP"
        );
    }

    #[test]
    fn wrong_type() {
        let pd = presentation_definition(None);
        let mut vc = credential();
        vc["type"] = json!(["VerifiableCredential"]);
        let vp = presentation(vc, KYBPAML_INPUT);
        assert_eq!(
            message(assert_valid_submission(&vp, &pd)),
            "Submission claims having descriptorId kybpaml_input but the matching type KYBPAMLAttestation does not exist in the credential"
        );
    }

    #[test]
    fn missing_attestation() {
        let pd = presentation_definition(None);
        let mut vc = credential();
        if let Some(subject) = vc["credentialSubject"].as_object_mut() {
            subject.remove(KYBPAML_ATTESTATION);
        }
        let vp = presentation(vc, KYBPAML_INPUT);
        assert_eq!(
            message(assert_valid_submission(&vp, &pd)),
            "No attestation of type KYBPAMLAttestation present in credential"
        );
    }

    #[test]
    fn schema_violation() {
        let pd = presentation_definition(None);
        let mut vc = credential();
        vc["credentialSubject"][KYBPAML_ATTESTATION]["extra"] = json!("x");
        let vp = presentation(vc, KYBPAML_INPUT);
        assert!(
            message(assert_valid_submission(&vp, &pd))
                .starts_with("Credential does not adhere to schema: input ")
        );

        let mut vc = credential();
        vc["credentialSubject"][KYBPAML_ATTESTATION]["process"] = json!(7);
        let vp = presentation(vc, KYBPAML_INPUT);
        assert!(
            message(assert_valid_submission(&vp, &pd))
                .starts_with("Credential does not adhere to schema: /process ")
        );
    }

    #[test]
    fn unknown_schema() {
        let mut pd = presentation_definition(None);
        pd.input_descriptors[0].schema[0].uri = "https://example.com/schema".to_string();
        let vp = presentation(credential(), KYBPAML_INPUT);
        assert_eq!(
            message(assert_valid_submission(&vp, &pd)),
            "Unknown schema: https://example.com/schema"
        );
    }

    #[test]
    fn untrusted_issuer() {
        let pd = presentation_definition(Some("^did:web:trusted\\.example$"));
        let vp = presentation(credential(), KYBPAML_INPUT);
        assert_eq!(
            message(assert_valid_submission(&vp, &pd)),
            "Credential did not satisfy required constraint: The issuer of the credential must be trusted"
        );
    }

    #[test]
    fn approval_date_format() {
        let pd = presentation_definition(None);
        let mut vc = credential();
        vc["credentialSubject"][KYBPAML_ATTESTATION]["approvalDate"] = json!("2022-01-06");
        let vp = presentation(vc, KYBPAML_INPUT);
        assert_eq!(
            message(assert_valid_submission(&vp, &pd)),
            "Credential did not satisfy required constraint: The date upon which this KYBP/AML Attestation was issued."
        );
    }

    #[test]
    fn missing_field() {
        let mut pd = presentation_definition(None);
        let constraints = pd.input_descriptors[0].constraints.as_mut().expect("constraints");
        let fields = constraints.fields.as_mut().expect("fields");
        fields.push(Field {
            path: vec!["$.credentialSubject.KYBPAMLAttestation.jurisdiction".to_string()],
            id: Some("jurisdiction".to_string()),
            ..Field::default()
        });
        let vp = presentation(credential(), KYBPAML_INPUT);
        assert_eq!(
            message(assert_valid_submission(&vp, &pd)),
            "Credential is missing required field: jurisdiction"
        );

        // preferred fields may be absent
        let constraints = pd.input_descriptors[0].constraints.as_mut().expect("constraints");
        let fields = constraints.fields.as_mut().expect("fields");
        if let Some(field) = fields.last_mut() {
            field.predicate = Some(Predicate::Preferred);
        }
        assert!(assert_valid_submission(&vp, &pd).is_ok());
    }

    #[test]
    fn filters_compile_before_credentials() {
        let mut pd = presentation_definition(None);
        let constraints = pd.input_descriptors[0].constraints.as_mut().expect("constraints");
        let fields = constraints.fields.as_mut().expect("fields");
        fields[0].filter = Some(json!({"type": 5}));

        let mut vc = credential();
        vc["type"] = json!(["VerifiableCredential"]);
        let vp = presentation(vc, KYBPAML_INPUT);
        let err = assert_valid_submission(&vp, &pd).expect_err("should fail");
        assert!(!err.is_client_error());
    }

    #[test]
    fn unregistered_descriptor() {
        let mut pd = presentation_definition(None);
        pd.input_descriptors[0].id = "custom_input".to_string();
        let vp = presentation(credential(), "custom_input");
        let err = assert_valid_submission(&vp, &pd).expect_err("should fail");
        assert!(!err.is_client_error());
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn unconstrained_descriptor() {
        let mut pd = presentation_definition(None);
        pd.input_descriptors[0].constraints = None;
        let mut vc = credential();
        vc["type"] = json!(["VerifiableCredential"]);
        let vp = presentation(vc, KYBPAML_INPUT);
        assert!(assert_valid_submission(&vp, &pd).is_ok());
    }
}
