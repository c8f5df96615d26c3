//! # Verification Record
//!
//! The persisted state of a single verification, from offer to outcome.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use verity_vdc::VerifiablePresentation;

use crate::error::invalid;
use crate::types::{PresentationDefinition, VerificationResult};

/// A verification of one subject address on one network.
///
/// The record is created when the verification is offered. The credential
/// submission is written once, together with the outcome.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Verification id. Equal to the presentation definition's id.
    pub id: String,

    /// The network the verification result is signed for.
    pub network: Network,

    /// The address being verified.
    pub subject: String,

    /// Chain id. For Solana, the numeric form of the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    /// Address of the registry contract verifying the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_address: Option<String>,

    /// Domain name used when signing the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Domain version used when signing the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Nonce the submitted presentation must be bound to.
    pub challenge: String,

    /// The definition offered to the holder.
    pub presentation_definition: PresentationDefinition,

    /// Current status.
    pub status: Status,

    /// Reason for rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,

    /// When the verification was offered.
    pub offered_at: DateTime<Utc>,

    /// When a submission was last recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,

    /// The accepted presentation. Written once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_submission: Option<VerifiablePresentation>,

    /// The signed verification result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_result: Option<VerificationResult>,

    /// Signature over `verification_result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Verification {
    /// Create a new verification in the `created` state.
    #[must_use]
    pub fn new(
        network: Network, subject: impl Into<String>, challenge: impl Into<String>,
        presentation_definition: PresentationDefinition,
    ) -> Self {
        Self {
            id: presentation_definition.id.clone(),
            network,
            subject: subject.into(),
            chain_id: None,
            registry_address: None,
            name: None,
            version: None,
            challenge: challenge.into(),
            presentation_definition,
            status: Status::Created,
            status_detail: None,
            offered_at: Utc::now(),
            verified_at: None,
            credential_submission: None,
            verification_result: None,
            signature: None,
        }
    }

    /// Returns `true` once a credential submission has been recorded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.credential_submission.is_some()
    }

    /// Apply a submission outcome to the record.
    pub fn apply(&mut self, submission: &Submission) {
        self.status = submission.status;
        self.status_detail.clone_from(&submission.status_detail);
        self.credential_submission.clone_from(&submission.credential_submission);
        self.verification_result.clone_from(&submission.verification_result);
        self.signature.clone_from(&submission.signature);
        self.verified_at = Some(submission.verified_at);
    }
}

/// The outcome of a submission, written to the record in one update.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// New status.
    pub status: Status,

    /// Reason for rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,

    /// The accepted presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_submission: Option<VerifiablePresentation>,

    /// The signed verification result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_result: Option<VerificationResult>,

    /// Signature over `verification_result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// When the submission was processed.
    pub verified_at: DateTime<Utc>,
}

impl Submission {
    /// An approved submission with its signed result.
    #[must_use]
    pub fn approved(
        presentation: VerifiablePresentation, result: VerificationResult, signature: String,
    ) -> Self {
        Self {
            status: Status::Approved,
            status_detail: None,
            credential_submission: Some(presentation),
            verification_result: Some(result),
            signature: Some(signature),
            verified_at: Utc::now(),
        }
    }

    /// A rejected submission. Nothing is recorded as submitted, so the
    /// holder may submit again.
    #[must_use]
    pub fn rejected(detail: impl Into<String>) -> Self {
        Self {
            status: Status::Rejected,
            status_detail: Some(detail.into()),
            credential_submission: None,
            verification_result: None,
            signature: None,
            verified_at: Utc::now(),
        }
    }
}

/// Networks verification results can be signed for.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// EIP-712 typed data signatures.
    #[default]
    Ethereum,

    /// Borsh-serialized, keccak-256 hashed signatures.
    Solana,
}

impl FromStr for Network {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ethereum" => Ok(Self::Ethereum),
            "solana" => Ok(Self::Solana),
            _ => Err(invalid!("Unsupported network: {s}")),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ethereum => write!(f, "ethereum"),
            Self::Solana => write!(f, "solana"),
        }
    }
}

/// Verification status.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Offered, awaiting a successful submission.
    #[default]
    Created,

    /// A submission was verified and the result signed.
    Approved,

    /// The last submission failed verification.
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network() {
        assert_eq!("solana".parse::<Network>().expect("should parse"), Network::Solana);
        let err = "bitcoin".parse::<Network>().expect_err("should fail");
        assert_eq!(err.message(), "Unsupported network: bitcoin");
    }

    #[test]
    fn apply_submission() {
        let pd = PresentationDefinition {
            id: "c62af7a4-82d5-42be-bd93-df12955e9a4e".to_string(),
            ..PresentationDefinition::default()
        };
        let mut verification = Verification::new(Network::Ethereum, "0xabc", "nonce", pd);
        assert_eq!(verification.id, "c62af7a4-82d5-42be-bd93-df12955e9a4e");
        assert_eq!(verification.status, Status::Created);

        verification.apply(&Submission::rejected("Credential has expired."));
        assert_eq!(verification.status, Status::Rejected);
        assert!(!verification.is_complete());

        let result = VerificationResult::default();
        verification.apply(&Submission::approved(
            VerifiablePresentation::default(),
            result,
            "0x00".to_string(),
        ));
        assert_eq!(verification.status, Status::Approved);
        assert_eq!(verification.status_detail, None);
        assert!(verification.is_complete());
    }
}
