use chrono::Utc;
use verity_vdc::VerifiableCredential;

use crate::Result;
use crate::error::invalid;

/// Confirm the credential has not passed its `expirationDate`, if it has
/// one. JWT `exp` claims are normalized to `expirationDate`.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` if the credential has expired.
pub fn assert_not_expired(credential: &VerifiableCredential) -> Result<()> {
    if let Some(expiration) = credential.expiration_date
        && expiration < Utc::now()
    {
        return Err(invalid!("Credential has expired."));
    }
    Ok(())
}
