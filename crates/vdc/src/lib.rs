//! # Verifiable Digital Credentials
//!
//! The W3C Verifiable Credential and Verifiable Presentation data model, and
//! the envelope decoder that turns VC-JWT and VP-JWT submissions into that
//! model.

mod error;
pub mod w3c_vc;

pub use self::error::Error;
pub use self::w3c_vc::{
    CredentialSchema, CredentialSubject, DescriptorMap, Issuer, PresentationSubmission, Proof,
    VerifiableCredential, VerifiablePresentation, decode_vc, decode_vp, verify_vp,
};
