//! # Envelope Decoder
//!
//! Decodes VP-JWT and VC-JWT submissions into the W3C data model.
//!
//! [`decode_vp`] and [`decode_vc`] verify the JWS against the signer's DID
//! document. [`verify_vp`] is the lenient path used for submissions: it
//! accepts signed tokens without checking the signature, falls back to
//! unsecured (`alg: none`) tokens, and relies on the challenge for binding.
//! Embedded credentials are verified individually with [`decode_vc`].
//!
//! JWT `exp`/`nbf` claims are not enforced here; credential expiry is a
//! separate check over `expirationDate`.

use serde_json::{Map, Value};
use tracing::instrument;
use verity_core::did::DidResolver;
use verity_core::jose::{self, Algorithm};

use crate::Error;
use crate::w3c_vc::jwt::{normalize_credential, normalize_presentation};
use crate::w3c_vc::vc::VerifiableCredential;
use crate::w3c_vc::vp::VerifiablePresentation;

type Claims = Map<String, Value>;

/// Decode a VP-JWT, verifying its signature against the holder's DID.
///
/// When `challenge` is provided the presentation's `nonce` must match it.
///
/// # Errors
///
/// Returns [`Error::InvalidPresentation`] if the signature does not verify
/// or the presentation is malformed, and [`Error::InvalidNonce`] on a
/// challenge mismatch.
#[instrument(level = "debug", skip_all)]
pub async fn decode_vp(
    jwt: &str, challenge: Option<&str>, resolver: &impl DidResolver,
) -> Result<VerifiablePresentation, Error> {
    let decoded: jose::Jwt<Claims> = jose::verify(jwt, resolver).await.map_err(|e| {
        tracing::info!(error = %e, "JWT VP verification failed");
        Error::InvalidPresentation(e.to_string())
    })?;
    finish_presentation(jwt, decoded.claims, challenge)
}

/// Decode a VC-JWT, verifying its signature against the issuer's DID.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] when no issuer key validates the
/// signature and [`Error::InvalidCredential`] for any other failure.
#[instrument(level = "debug", skip_all)]
pub async fn decode_vc(
    jwt: &str, resolver: &impl DidResolver,
) -> Result<VerifiableCredential, Error> {
    let decoded: jose::Jwt<Claims> = jose::verify(jwt, resolver).await.map_err(|e| {
        tracing::info!(error = %e, "VC decode failed");
        match e {
            jose::Error::InvalidSignature => Error::InvalidSignature,
            e => Error::InvalidCredential(e.to_string()),
        }
    })?;

    let vc = normalize_credential(jwt, decoded.claims).map_err(Error::InvalidCredential)?;
    vc.validate().map_err(Error::InvalidCredential)?;
    Ok(vc)
}

/// Decode a VP-JWT without verifying its signature.
///
/// Decoding is attempted first as a signed compact JWS and then as an
/// unsecured JWT. When `challenge` is provided the presentation's `nonce`
/// must match it.
///
/// # Errors
///
/// Returns [`Error::InvalidPresentation`] if neither decode succeeds or the
/// presentation is malformed, and [`Error::InvalidNonce`] on a missing or
/// mismatched challenge.
#[instrument(level = "debug", skip_all)]
pub fn verify_vp(jwt: &str, challenge: Option<&str>) -> Result<VerifiablePresentation, Error> {
    let claims = match decode_signed(jwt) {
        Ok(claims) => claims,
        Err(signed) => {
            tracing::info!(error = %signed, "signed decode failed, falling back to unsecured JWT");
            match jose::decode_unsecured::<Claims>(jwt) {
                Ok(decoded) => decoded.claims,
                Err(unsecured) => {
                    return Err(Error::InvalidPresentation(format!(
                        "{signed}; as unsecured JWT: {unsecured}"
                    )));
                }
            }
        }
    };
    finish_presentation(jwt, claims, challenge)
}

fn decode_signed(jwt: &str) -> Result<Claims, jose::Error> {
    let decoded: jose::Jwt<Claims> = jose::decode(jwt)?;
    if decoded.header.alg == Algorithm::None || jwt.ends_with('.') {
        return Err(jose::Error::Malformed("JWT is not signed".to_string()));
    }
    Ok(decoded.claims)
}

fn finish_presentation(
    jwt: &str, claims: Claims, challenge: Option<&str>,
) -> Result<VerifiablePresentation, Error> {
    let vp = normalize_presentation(jwt, claims).map_err(Error::InvalidPresentation)?;
    vp.validate().map_err(Error::InvalidPresentation)?;

    if let Some(expected) = challenge
        && vp.challenge() != Some(expected)
    {
        return Err(Error::InvalidNonce);
    }
    Ok(vp)
}
