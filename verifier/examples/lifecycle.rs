//! Runs a verification from creation to a signed result against the
//! in-memory provider, logging each step.
//!
//! ```bash
//! cargo run --example lifecycle
//! ```

use serde_json::json;
use test_utils::{Holder, Verifier};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use verity_verifier::generate::{KYBPAML_ATTESTATION, KYBPAML_INPUT, KYBPAML_SCHEMA};
use verity_verifier::{
    CreateRequest, CreateResponse, OfferRequest, StatusRequest, StatusResponse, SubmitRequest,
    SubmitResponse, VerificationOffer, handle,
};

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("should set subscriber");

    let provider = Verifier::new();
    let issuer = Holder::ed25519();
    let subject = Holder::ethereum();
    let address = subject.address().expect("should have address");

    let request = CreateRequest {
        network: "ethereum".to_string(),
        subject: address.to_string(),
        chain_id: Some(verity_verifier::ChainRef::Id(1337)),
        ..CreateRequest::default()
    };
    let created = handle::<_, _, CreateResponse>(request, &provider).await.expect("should create");

    let offer = handle::<_, _, VerificationOffer>(OfferRequest { id: created.id.clone() }, &provider)
        .await
        .expect("should offer");
    println!("{}", serde_json::to_string_pretty(&offer.body).expect("should serialize"));

    let credential = issuer
        .sign(&json!({
            "sub": subject.did(),
            "nbf": chrono::Utc::now().timestamp(),
            "vc": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiableCredential", KYBPAML_ATTESTATION],
                "credentialSubject": {
                    KYBPAML_ATTESTATION: {
                        "type": KYBPAML_ATTESTATION,
                        "process": KYBPAML_SCHEMA,
                        "approvalDate": chrono::Utc::now().to_rfc3339()
                    }
                }
            }
        }))
        .await
        .expect("should issue credential");

    let presentation = subject
        .sign(&json!({
            "nonce": offer.body.body.challenge,
            "vp": {
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": ["VerifiablePresentation"],
                "holder": subject.did(),
                "verifiableCredential": [credential],
                "presentation_submission": {
                    "id": "lifecycle",
                    "definition_id": created.id,
                    "descriptor_map": [
                        {"id": KYBPAML_INPUT, "format": "jwt_vc", "path": "$.verifiableCredential[0]"}
                    ]
                }
            }
        }))
        .await
        .expect("should sign presentation");

    let request = SubmitRequest { id: created.id.clone(), submission: presentation };
    let submitted = handle::<_, _, SubmitResponse>(request, &provider).await.expect("should submit");
    println!("{}", serde_json::to_string_pretty(&submitted.body).expect("should serialize"));

    let status = handle::<_, _, StatusResponse>(StatusRequest { id: created.id.clone() }, &provider)
        .await
        .expect("should get status");
    tracing::info!(status = ?status.body.status, "verification complete");
}
