//! # Presentation Definition
//!
//! The verifier's declaration of the credentials it accepts, following the
//! [DIF Presentation Exchange](https://identity.foundation/presentation-exchange/spec/v1.0.0)
//! data model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Presentation Definition offered to a holder. It is embedded verbatim in
/// the verification record so that submissions are validated against the
/// exact definition offered.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PresentationDefinition {
    /// Unique identifier. Doubles as the verification id.
    pub id: String,

    /// The credentials the verifier is prepared to accept.
    pub input_descriptors: Vec<InputDescriptor>,

    /// Accepted claim formats and signing algorithms.
    #[serde(default)]
    pub format: Format,

    /// Human-friendly name of the definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The purpose for which the definition's inputs are requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl PresentationDefinition {
    /// The input descriptor with the given id.
    #[must_use]
    pub fn descriptor(&self, id: &str) -> Option<&InputDescriptor> {
        self.input_descriptors.iter().find(|d| d.id == id)
    }
}

/// Accepted JWT formats.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Format {
    /// Generic JWT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<Algorithms>,

    /// JWT-encoded credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_vc: Option<Algorithms>,

    /// JWT-encoded presentations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_vp: Option<Algorithms>,
}

/// Signing algorithms accepted for a format.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Algorithms {
    /// JWS `alg` values, e.g. `EdDSA`.
    pub alg: Vec<String>,
}

/// Describes a credential the verifier will accept.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct InputDescriptor {
    /// Identifier, unique within the definition.
    pub id: String,

    /// Schemas the credential's attestation must conform to.
    pub schema: Vec<SchemaRef>,

    /// Groups the descriptor belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<String>>,

    /// Human-friendly name of the descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The purpose for which the credential is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Constraints the credential must satisfy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

impl InputDescriptor {
    /// The descriptor's schema URIs, in order.
    pub fn schema_uris(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(|s| s.uri.as_str())
    }
}

/// Reference to a credential schema.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SchemaRef {
    /// Schema URI.
    pub uri: String,

    /// Whether the schema is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Constraints on a credential's content and status.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Constraints {
    /// Field-level constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,

    /// Requirements on the credential's status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Statuses>,

    /// Requirements binding the holder to the credential subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_holder: Option<Vec<IsHolder>>,
}

/// Status requirements, per status kind.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Statuses {
    /// Active credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<StatusDirective>,

    /// Suspended credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<StatusDirective>,

    /// Revoked credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked: Option<StatusDirective>,
}

/// Wraps a status [`Directive`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusDirective {
    /// The directive.
    pub directive: Directive,
}

/// How a status applies to acceptable credentials.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Credentials must have the status.
    Required,

    /// Credentials may have the status.
    Allowed,

    /// Credentials must not have the status.
    Disallowed,
}

/// Requires that the holder is the subject of the identified fields.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct IsHolder {
    /// Ids of the fields the holder must be the subject of.
    pub field_id: Vec<String>,

    /// Whether the requirement is mandatory.
    pub directive: Predicate,
}

/// A field-level constraint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Field {
    /// Candidate JSONPath expressions, evaluated in order. The first path
    /// that resolves supplies the field's value.
    pub path: Vec<String>,

    /// Field identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Why the field is requested. Reported when the field is rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// JSON Schema the field's value must satisfy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,

    /// Whether the field must be present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,
}

/// Whether a constraint is mandatory.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// The constraint must be satisfied.
    Required,

    /// The constraint should be satisfied, but may be absent.
    Preferred,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize() {
        let pd: PresentationDefinition = serde_json::from_value(json!({
            "id": "c62af7a4-82d5-42be-bd93-df12955e9a4e",
            "format": {"jwt_vc": {"alg": ["EdDSA", "ES256K"]}},
            "input_descriptors": [{
                "id": "kybpaml_input",
                "schema": [{"uri": "https://verite.id/definitions/processes/kycaml/0.0.1/generic--usa-legal_person", "required": true}],
                "constraints": {
                    "statuses": {"active": {"directive": "required"}, "revoked": {"directive": "disallowed"}},
                    "is_holder": [{"field_id": ["subjectId"], "directive": "required"}],
                    "fields": [{
                        "path": ["$.issuer.id", "$.issuer"],
                        "purpose": "The issuer of the credential must be trusted",
                        "predicate": "required",
                        "filter": {"type": "string"}
                    }]
                }
            }]
        }))
        .expect("should deserialize");

        let descriptor = pd.descriptor("kybpaml_input").expect("should have descriptor");
        let constraints = descriptor.constraints.as_ref().expect("should have constraints");
        let statuses = constraints.statuses.as_ref().expect("should have statuses");
        assert_eq!(
            statuses.revoked.as_ref().map(|s| s.directive),
            Some(Directive::Disallowed)
        );
        let fields = constraints.fields.as_ref().expect("should have fields");
        assert_eq!(fields[0].predicate, Some(Predicate::Required));
        assert!(pd.descriptor("accinv_input").is_none());

        // absent members are not serialized
        let value = serde_json::to_value(&pd).expect("should serialize");
        assert!(value.get("name").is_none());
        assert!(value["format"].get("jwt").is_none());
    }
}
