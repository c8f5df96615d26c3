//! # Proofs

use serde::{Deserialize, Serialize};

/// Proof type attached to credentials and presentations decoded from JWTs.
pub const JWT_PROOF_TYPE: &str = "JwtProof2020";

/// The proof of a credential or presentation. Only the enveloping JWT proof
/// form is produced by this crate; other members are optional so embedded
/// proofs still deserialize.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Proof {
    /// The proof type, e.g. "`JwtProof2020`".
    #[serde(rename = "type")]
    pub type_: String,

    /// The enveloping JWT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,

    /// Used to mitigate replay attacks. Carries the JWT `nonce` claim of a
    /// presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    /// Verification method, for embedded proofs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,

    /// Proof purpose, for embedded proofs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
}

impl Proof {
    /// A `JwtProof2020` proof for `jwt`.
    #[must_use]
    pub fn jwt(jwt: impl Into<String>) -> Self {
        Self {
            type_: JWT_PROOF_TYPE.to_string(),
            jwt: Some(jwt.into()),
            ..Self::default()
        }
    }
}
