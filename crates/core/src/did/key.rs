//! `did:key` resolution.

use anyhow::Result;

use super::{Did, Document, VerificationMethod};
use crate::key::PublicKey;

pub fn resolve(did: &Did) -> Result<Document> {
    let key = PublicKey::from_multibase(did.id)?;
    let type_ = match key {
        PublicKey::Ed25519(_) => "Ed25519VerificationKey2020",
        _ => "EcdsaSecp256k1VerificationKey2019",
    };

    let did_str = format!("did:key:{}", did.id);
    let vm_id = format!("{did_str}#{}", did.id);
    let vm = VerificationMethod {
        id: vm_id.clone(),
        type_: type_.to_string(),
        controller: did_str.clone(),
        public_key_multibase: Some(did.id.to_string()),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519() {
        let did = Did::parse("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK")
            .expect("should parse");
        let doc = resolve(&did).expect("should resolve");

        assert_eq!(doc.id, "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK");
        let vm = &doc.verification_method[0];
        assert_eq!(vm.fragment(), Some("z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"));
        assert!(matches!(vm.public_key(), Ok(PublicKey::Ed25519(_))));
    }

    #[test]
    fn unsupported_codec() {
        // base58btc of a p256 multicodec key
        let did = Did::parse("did:key:zDnaerDaTF5BXEavCrfRZEk316dpbLsfPDZ3WJ5hRTPFU2169")
            .expect("should parse");
        assert!(resolve(&did).is_err());
    }
}
