//! # Credential Status
//!
//! Support for W3C `StatusList2021` revocation lists.
//!
//! A revocable credential carries a `credentialStatus` entry pointing at a
//! status list credential and an index into that list. Verifiers fetch the
//! status list credential, decode its `encodedList` bitstring, and check the
//! bit at the credential's index.

mod error;
mod fetch;
mod provider;
mod status_list;

use serde::{Deserialize, Serialize};

pub use self::error::*;
pub use self::fetch::*;
pub use self::provider::*;
pub use self::status_list::*;

/// `credentialStatus` type for status list entries.
pub const STATUS_LIST_ENTRY_TYPE: &str = "StatusList2021Entry";

/// Type of the credential that carries a status list.
pub const STATUS_LIST_CREDENTIAL_TYPE: &str = "StatusList2021Credential";

/// A `credentialStatus` entry referencing a position in a status list.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusListEntry {
    /// Identifier of the status entry.
    pub id: String,

    /// Entry type, typically `StatusList2021Entry`.
    #[serde(rename = "type")]
    pub type_: String,

    /// Purpose of the status entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_purpose: Option<StatusPurpose>,

    /// Position of the credential in the status list. Issuers write the
    /// index as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list_index: Option<StatusIndex>,

    /// URL of the status list credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list_credential: Option<String>,
}

impl StatusListEntry {
    /// Returns `true` when the entry carries an index into a status list.
    #[must_use]
    pub const fn is_revocable(&self) -> bool {
        self.status_list_index.is_some()
    }
}

/// Purpose of a status list.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StatusPurpose {
    /// Set bits mark revoked credentials.
    #[default]
    Revocation,

    /// Set bits mark suspended credentials.
    Suspension,
}

/// A status list index, written as either a string or a number.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusIndex {
    /// Decimal string form.
    String(String),

    /// Numeric form.
    Number(u64),
}

impl StatusIndex {
    /// Parse the index.
    ///
    /// # Errors
    ///
    /// Returns an error if a string index is not a non-negative integer.
    pub fn value(&self) -> anyhow::Result<usize> {
        match self {
            Self::String(s) => {
                s.trim().parse().map_err(|_| anyhow::anyhow!("invalid status list index: {s}"))
            }
            Self::Number(n) => Ok(usize::try_from(*n)?),
        }
    }
}

impl From<usize> for StatusIndex {
    fn from(value: usize) -> Self {
        Self::String(value.to_string())
    }
}

/// `credentialSubject` of a status list credential.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusListSubject {
    /// Identifier of the status list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Subject type, typically `RevocationList2021` or `StatusList2021`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Purpose of the list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_purpose: Option<StatusPurpose>,

    /// Deflate-compressed, base64-encoded bitstring.
    pub encoded_list: String,
}
