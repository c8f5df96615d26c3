//! # Verifiable Presentations Data Model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use verity_core::{Kind, OneMany};

use crate::w3c_vc::proof::Proof;
use crate::w3c_vc::vc::{VerifiableCredential, validate_context};

/// A Verifiable Presentation is used to combine and present credentials to a
/// Verifier. See <https://www.w3.org/TR/vc-data-model/#presentations>.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifiablePresentation {
    /// The @context property is used to map property URIs into short-form
    /// aliases.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// Unique identifier of the presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The type property is required and expresses the type of presentation,
    /// such as `VerifiablePresentation`.
    #[serde(rename = "type")]
    pub type_: OneMany<String>,

    /// The credentials presented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifiable_credential: Option<Vec<VerifiableCredential>>,

    /// The entity generating the presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,

    /// Maps the verifier's input descriptors to the credentials presented.
    #[serde(rename = "presentation_submission", skip_serializing_if = "Option::is_none")]
    pub presentation_submission: Option<PresentationSubmission>,

    /// The presentation's proof.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,

    /// Members not otherwise modelled.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerifiablePresentation {
    /// The presented credentials, in order.
    #[must_use]
    pub fn credentials(&self) -> &[VerifiableCredential] {
        self.verifiable_credential.as_deref().unwrap_or_default()
    }

    /// The challenge the presentation was bound to.
    #[must_use]
    pub fn challenge(&self) -> Option<&str> {
        self.proof.as_ref().and_then(|p| p.challenge.as_deref())
    }

    /// Check the presentation has the members the data model requires.
    ///
    /// # Errors
    ///
    /// Returns a description of the first missing or malformed member.
    pub fn validate(&self) -> Result<(), String> {
        validate_context(&self.context)?;
        if !self.type_.iter().any(|t| t == "VerifiablePresentation") {
            return Err("type is missing default \"VerifiablePresentation\"".to_string());
        }
        Ok(())
    }
}

/// A Presentation Submission expresses how the inputs presented as proofs to
/// a Verifier are provided in accordance with the requirements specified in
/// a Presentation Definition.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PresentationSubmission {
    /// Unique identifier of the submission.
    #[serde(default)]
    pub id: String,

    /// The id of the Presentation Definition the submission responds to.
    #[serde(default)]
    pub definition_id: String,

    /// Input descriptor to credential mappings.
    pub descriptor_map: Vec<DescriptorMap>,
}

/// Maps an input descriptor to the credential that satisfies it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DescriptorMap {
    /// The id of the satisfied input descriptor.
    pub id: String,

    /// Format of the matched credential, e.g. `jwt_vc`.
    #[serde(default)]
    pub format: String,

    /// JSONPath from the presentation to the credential.
    pub path: String,

    /// Path into a nested structure, evaluated relative to `path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_nested: Option<Box<DescriptorMap>>,
}
