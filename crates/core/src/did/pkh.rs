//! `did:pkh` resolution.
//!
//! The method-specific identifier is a CAIP-10 account id. The document has
//! a single recovery method bound to the account.

use anyhow::{Result, bail};

use super::{Did, Document, VerificationMethod};
use crate::key::AccountId;

pub fn resolve(did: &Did) -> Result<Document> {
    let account: AccountId = did.id.parse()?;

    let type_ = match account.namespace.as_str() {
        "eip155" => {
            if !account.is_ethereum() {
                bail!("invalid Ethereum address: {}", account.address);
            }
            "EcdsaSecp256k1RecoveryMethod2020"
        }
        "solana" => "Ed25519VerificationKey2018",
        ns => bail!("unsupported did:pkh namespace: {ns}"),
    };

    let did_str = format!("did:pkh:{}", did.id);
    let vm_id = format!("{did_str}#blockchainAccountId");
    let vm = VerificationMethod {
        id: vm_id.clone(),
        type_: type_.to_string(),
        controller: did_str.clone(),
        blockchain_account_id: Some(account.to_string()),
        ..VerificationMethod::default()
    };

    Ok(Document {
        context: vec!["https://www.w3.org/ns/did/v1".into()],
        id: did_str,
        verification_method: vec![vm],
        authentication: vec![vm_id.clone().into()],
        assertion_method: vec![vm_id.into()],
        ..Document::default()
    })
}
