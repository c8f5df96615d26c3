//! # Requests and Responses
//!
//! Bodies accepted and returned by the verification handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PresentationDefinition, Status, VerificationResult};

/// The `type` of a verification offer.
pub const VERIFICATION_REQUEST_TYPE: &str = "VerificationRequest";

/// Request to create a verification for a subject address.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// `ethereum` or `solana`.
    pub network: String,

    /// The address to verify.
    pub subject: String,

    /// Ethereum chain id, or Solana cluster name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainRef>,

    /// Address of the registry contract that will verify the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_address: Option<String>,

    /// Signing domain name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Signing domain version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A chain reference as supplied by the caller.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChainRef {
    /// Numeric chain id (Ethereum).
    Id(i64),

    /// Cluster name (Solana).
    Name(String),
}

/// The created verification.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    /// Verification id.
    pub id: String,

    /// The challenge the submission must be bound to.
    pub challenge: String,

    /// The definition the submission must satisfy.
    pub presentation_definition: PresentationDefinition,
}

/// Request for the offer of an existing verification.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OfferRequest {
    /// Verification id.
    pub id: String,
}

/// The verification offer presented to a holder's wallet.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct VerificationOffer {
    /// Verification id.
    pub id: String,

    /// Always [`VERIFICATION_REQUEST_TYPE`].
    #[serde(rename = "type")]
    pub type_: String,

    /// The verifier's DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// When the verification was offered.
    pub created_time: DateTime<Utc>,

    /// When the offer lapses.
    pub expires_time: DateTime<Utc>,

    /// Offer contents.
    pub body: OfferBody,
}

/// Contents of a [`VerificationOffer`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct OfferBody {
    /// The challenge the submission must be bound to.
    pub challenge: String,

    /// The definition the submission must satisfy.
    pub presentation_definition: PresentationDefinition,
}

/// A holder's submission for a verification.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Verification id.
    pub id: String,

    /// The VP-JWT.
    pub submission: String,
}

/// The outcome of a successful submission.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Always [`Status::Approved`].
    pub status: Status,

    /// The signed result.
    pub verification_result: VerificationResult,

    /// `0x`-prefixed, 65-byte signature over the result.
    pub signature: String,
}

/// Request for the status of a verification.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusRequest {
    /// Verification id.
    pub id: String,
}

/// The status of a verification.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Current status.
    pub status: Status,

    /// The signed result, once approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_result: Option<VerificationResult>,

    /// Signature over the result, once approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Reason for rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
