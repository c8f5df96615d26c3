//! # Credential Checks
//!
//! Trust and freshness checks applied to each presented credential: expiry,
//! revocation, and binding to the verification's subject.

mod expiry;
mod revocation;
mod subject;

use verity_vdc::VerifiableCredential;

pub use self::expiry::assert_not_expired;
pub use self::revocation::assert_not_revoked;
pub use self::subject::{assert_subject_matches, did_to_address};
use crate::Result;
use crate::error::invalid;

/// Confirm the presentation's holder is the credential's subject.
///
/// Not part of the default pipeline, which binds credentials to the
/// verification's subject address instead.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` if the holder and subject differ.
pub fn assert_holder_is_subject(holder: &str, credential: &VerifiableCredential) -> Result<()> {
    if credential.subject_id() != Some(holder) {
        return Err(invalid!("Presentation is not signed by the subject"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn holder_is_subject() {
        let vc: VerifiableCredential = serde_json::from_value(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": "did:key:z6MkIssuer",
            "credentialSubject": {"id": "did:key:z6MkHolder"}
        }))
        .expect("should deserialize");

        assert!(assert_holder_is_subject("did:key:z6MkHolder", &vc).is_ok());
        let err = assert_holder_is_subject("did:key:z6MkOther", &vc).expect_err("should fail");
        assert_eq!(err.message(), "Presentation is not signed by the subject");
    }
}
