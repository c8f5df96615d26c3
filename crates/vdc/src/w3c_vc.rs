//! # W3C Verifiable Credentials
//!
//! Data model (v1.1) and JWT envelope handling.

pub mod jwt;
mod proof;
mod vc;
mod verify;
mod vp;

pub use self::proof::{JWT_PROOF_TYPE, Proof};
pub use self::vc::{BASE_CONTEXT, CredentialSchema, CredentialSubject, Issuer, VerifiableCredential};
pub use self::verify::{decode_vc, decode_vp, verify_vp};
pub use self::vp::{DescriptorMap, PresentationSubmission, VerifiablePresentation};
