//! Borsh-encoded, keccak-hashed verification results for Solana programs.

use borsh::BorshSerialize;
use ethers::utils::keccak256;

use super::{SignOptions, Signer, encode_signature, recover_address};
use crate::error::{invalid, server};
use crate::types::{Cluster, SignedResult, VerificationResult};
use crate::Result;

/// Sign a verification result for a Solana program.
///
/// The signed message is the Borsh encoding of the set domain values
/// (`name`, `version`, cluster), the 32-byte subject public key, the
/// expiration, each schema URI, and the verification id.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` if the subject is not a base58-encoded
/// 32-byte public key, or `Error::ServerError` if signing fails.
pub fn sign(options: &SignOptions, signer: &Signer) -> Result<SignedResult> {
    let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.is_empty());

    let verification_result = VerificationResult {
        schema: options.schema.clone(),
        subject: options.subject.clone(),
        expiration: options.expiration(),
        verifier_verification_id: options.verifier_verification_id.clone(),
        name: non_empty(&options.name),
        version: non_empty(&options.version),
        cluster: options.chain_id.and_then(Cluster::from_chain_id),
    };

    let hash = hash(&verification_result)?;
    let signature = signer.sign_hash(hash)?;
    let signature = encode_signature(&signature);

    let recovered = recover_address(&signature, hash)?;
    tracing::debug!(signer = %signer.address(), %recovered, "signed solana verification result");

    Ok(SignedResult { verification_result, signature })
}

/// Recover the Ethereum-style address of the key that signed `signed`.
///
/// # Errors
///
/// Returns an error if the result cannot be re-encoded or the signature is
/// malformed.
pub fn recover(signed: &SignedResult) -> Result<String> {
    let hash = hash(&signed.verification_result)?;
    recover_address(&signed.signature, hash)
}

/// Decode a base58 Solana public key.
///
/// # Errors
///
/// Returns `Error::InvalidRequest` if `address` is not base58 or does not
/// decode to 32 bytes.
pub fn public_key(address: &str) -> Result<[u8; 32]> {
    let (_, bytes) = multibase::decode(format!("z{address}"))
        .map_err(|_| invalid!("Invalid subject address for solana"))?;
    bytes.try_into().map_err(|_| invalid!("Invalid subject address for solana"))
}

fn hash(result: &VerificationResult) -> Result<[u8; 32]> {
    Ok(keccak256(message(result)?))
}

fn message(result: &VerificationResult) -> Result<Vec<u8>> {
    let message = Message {
        name: result.name.as_deref(),
        version: result.version.as_deref(),
        cluster: result.cluster.map(Cluster::as_str),
        subject: public_key(&result.subject)?,
        expiration: result.expiration,
        schema: &result.schema,
        verifier_verification_id: &result.verifier_verification_id,
    };
    borsh::to_vec(&message).map_err(|e| server!("issue encoding result: {e}"))
}

// Domain values are omitted, not encoded as `Option`, when unset. Schema URIs
// are written back-to-back without a length prefix.
struct Message<'a> {
    name: Option<&'a str>,
    version: Option<&'a str>,
    cluster: Option<&'a str>,
    subject: [u8; 32],
    expiration: i64,
    schema: &'a [String],
    verifier_verification_id: &'a str,
}

impl BorshSerialize for Message<'_> {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for value in [self.name, self.version, self.cluster].into_iter().flatten() {
            value.serialize(writer)?;
        }
        self.subject.serialize(writer)?;
        self.expiration.serialize(writer)?;
        for uri in self.schema {
            uri.serialize(writer)?;
        }
        self.verifier_verification_id.serialize(writer)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    const KYCAML_SCHEMA: &str =
        "verite.id/definitions/processes/kycaml/0.0.1/generic--usa-legal_person";

    fn options() -> SignOptions {
        SignOptions {
            subject: "37Jon9vY6V9iXavKqTubjXY1iaUVo6xJJyG95SEHvvAV".to_string(),
            chain_id: Some(1337),
            name: Some("VerificationRegistry".to_string()),
            version: Some("1.0".to_string()),
            registry_address: None,
            expiration: DateTime::from_timestamp(1_641_492_587, 0),
            verifier_verification_id: "c62af7a4-82d5-42be-bd93-df12955e9a4e".to_string(),
            schema: vec![KYCAML_SCHEMA.to_string()],
        }
    }

    fn signer() -> Signer {
        Signer::new(super::super::DEFAULT_PRIVATE_KEY).expect("should parse")
    }

    #[test]
    fn signs_result() {
        let signed = sign(&options(), &signer()).expect("should sign");
        assert_eq!(
            signed.signature,
            "0x452b14e845ca81e9ead06d53db6376a5afb314f790b0a8aa74cc257c062105e240215c7e40d5d1af1ec12a8ce50f0f582bf79dd907e12d1c2fe6ae66bd6a70581c"
        );

        let result = &signed.verification_result;
        assert_eq!(result.name.as_deref(), Some("VerificationRegistry"));
        assert_eq!(result.version.as_deref(), Some("1.0"));
        assert_eq!(result.cluster, Some(Cluster::Localnet));
        assert_eq!(result.expiration, 1_641_492_587);
    }

    #[test]
    fn subject() {
        let options = SignOptions {
            subject: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
            ..options()
        };
        let signed = sign(&options, &signer()).expect("should sign");
        assert_eq!(
            signed.signature,
            "0xac1f2e8f612d7b6c78ffa6a7ac50ade4e9c6a07baccf8b1e5de69f16f9fa806d0122e39404a76b933fc86b7375e2523aaba40e5595d562efdebad313f46482141b"
        );
    }

    #[test]
    fn expiration() {
        let options =
            SignOptions { expiration: DateTime::from_timestamp(1_752_503_698, 0), ..options() };
        let signed = sign(&options, &signer()).expect("should sign");
        assert_eq!(
            signed.signature,
            "0x028d7b81fb7c782ba6600cbb5964df02a364a8c81eeb9aa19504f99ea148354b33d1727354b420c7407f4dc5c9311aec0d3459e047b800cf059333e35b178e961c"
        );
    }

    #[test]
    fn private_key() {
        let signer =
            Signer::new("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d")
                .expect("should parse");
        let signed = sign(&options(), &signer).expect("should sign");
        assert_eq!(
            signed.signature,
            "0xd2aa52b3cefeea9179497535aba9ea84f410038c2d2aa488b55cfe3b364192a84c9d5edad0f48a3753e67bbb7f51f708c267584fd486f4950b5150028e8e52bb1b"
        );
        assert_eq!(
            recover(&signed).expect("should recover"),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn domain_fields_are_prepended_when_set() {
        let full = sign(&options(), &signer()).expect("should sign").verification_result;
        let bytes = message(&full).expect("should encode");

        // name(4+20) version(4+3) cluster(4+8) subject(32) expiration(8)
        // schema(4+len each) verification id(4+36)
        let tail = 32 + 8 + (4 + KYCAML_SCHEMA.len()) + 4 + 36;
        assert_eq!(bytes.len(), 24 + 7 + 12 + tail);
        assert_eq!(&bytes[..4], &20u32.to_le_bytes());
        assert_eq!(&bytes[4..24], b"VerificationRegistry");
        assert_eq!(&bytes[35..43], b"localnet");
        assert_eq!(
            &bytes[43..75],
            &public_key("37Jon9vY6V9iXavKqTubjXY1iaUVo6xJJyG95SEHvvAV").expect("should decode")
        );

        let no_domain =
            VerificationResult { name: None, version: None, cluster: None, ..full.clone() };
        let bytes = message(&no_domain).expect("should encode");
        assert_eq!(bytes.len(), tail);
        assert_ne!(hash(&no_domain).expect("should hash"), hash(&full).expect("should hash"));

        // order is name, version, cluster whichever are present
        let cluster_only = VerificationResult { name: None, version: None, ..full.clone() };
        let bytes = message(&cluster_only).expect("should encode");
        assert_eq!(bytes.len(), 12 + tail);
        assert_eq!(&bytes[4..12], b"localnet");

        let unknown_chain = SignOptions { chain_id: Some(5), ..options() };
        let signed = sign(&unknown_chain, &signer()).expect("should sign");
        assert_eq!(signed.verification_result.cluster, None);
        assert_eq!(message(&signed.verification_result).expect("should encode").len(), 31 + tail);
    }

    #[test]
    fn several_schemas() {
        let options = SignOptions {
            schema: vec![
                "https://verite.id/definitions/processes/kycaml/0.0.1/generic--usa-legal_person"
                    .to_string(),
                crate::generate::ENTITY_ACCINV_SCHEMA.to_string(),
            ],
            ..options()
        };
        let signed = sign(&options, &signer()).expect("should sign");
        let bytes = message(&signed.verification_result).expect("should encode");
        let schema_len: usize = options.schema.iter().map(|s| s.len() + 4).sum();
        assert_eq!(bytes.len(), 24 + 7 + 12 + 32 + 8 + schema_len + 36 + 4);
        assert_eq!(
            recover(&signed).expect("should recover"),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn recovers_signer() {
        let signed = sign(&options(), &signer()).expect("should sign");
        assert_eq!(
            recover(&signed).expect("should recover"),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let mut tampered = signed;
        tampered.verification_result.expiration += 1;
        assert_ne!(
            recover(&tampered).expect("should recover"),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn invalid_subject() {
        assert!(public_key("37Jon9vY6V9iXavKqTubjXY1iaUVo6xJJyG95SEHvvAV").is_ok());

        let err = public_key("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").expect_err("not base58");
        assert_eq!(err.message(), "Invalid subject address for solana");

        let err = public_key("3yZe7d").expect_err("too short");
        assert_eq!(err.message(), "Invalid subject address for solana");
    }
}
