//! AIP signature blocks over BAP payloads
//!
//! The signed message is the concatenation of every payload field, hashed and
//! signed as a Bitcoin signed message. On the wire the block is
//! `AIP_PREFIX BITCOIN_ECDSA <address> <base64 signature>`.

use crate::constants::{AIP_ALGORITHM, AIP_PREFIX};
use crate::encode::EncodedPayload;
use crate::error::WasmBapError;
use crate::keys::{address_from_verifying_key, network_of_address, DerivedKey, Network};
use crate::message::{recover_signer, sign_bitcoin_message};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use k256::ecdsa::SigningKey;
use std::fmt;

/// AIP signature attached to a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlock {
    algorithm: String,
    address: String,
    signature: Vec<u8>,
}

impl SignatureBlock {
    pub fn new(algorithm: &str, address: &str, signature: Vec<u8>) -> SignatureBlock {
        SignatureBlock {
            algorithm: algorithm.to_string(),
            address: address.to_string(),
            signature,
        }
    }

    /// Parse the four AIP cells: prefix, algorithm, address, base64 signature
    pub fn from_cells(
        prefix: &[u8],
        algorithm: &[u8],
        address: &[u8],
        signature: &[u8],
    ) -> Result<SignatureBlock, WasmBapError> {
        if prefix != AIP_PREFIX.as_bytes() {
            return Err(WasmBapError::InvalidSignature(
                "missing AIP prefix".to_string(),
            ));
        }

        let text = |cell: &[u8], name: &str| -> Result<String, WasmBapError> {
            std::str::from_utf8(cell)
                .map(str::to_string)
                .map_err(|_| WasmBapError::InvalidSignature(format!("{} is not utf-8", name)))
        };

        let signature = STANDARD
            .decode(signature)
            .map_err(|e| WasmBapError::InvalidSignature(format!("invalid base64: {}", e)))?;

        Ok(SignatureBlock {
            algorithm: text(algorithm, "algorithm")?,
            address: text(address, "address")?,
            signature,
        })
    }

    pub fn protocol_prefix(&self) -> &'static str {
        AIP_PREFIX
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Raw 65-byte compact signature
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn signature_base64(&self) -> String {
        STANDARD.encode(&self.signature)
    }

    /// Wire fields in push order
    pub fn fields(&self) -> Vec<Vec<u8>> {
        vec![
            AIP_PREFIX.as_bytes().to_vec(),
            self.algorithm.as_bytes().to_vec(),
            self.address.as_bytes().to_vec(),
            self.signature_base64().into_bytes(),
        ]
    }

    /// Fails unless the block was produced by the key behind `expected`
    pub fn ensure_address(&self, expected: &str) -> Result<(), WasmBapError> {
        if self.address != expected {
            return Err(WasmBapError::AddressMismatch {
                expected: expected.to_string(),
                actual: self.address.clone(),
            });
        }
        Ok(())
    }

    /// Recover the signer from the signature and compare with the embedded address
    pub fn verify(&self, payload: &EncodedPayload) -> Result<bool, WasmBapError> {
        if self.algorithm != AIP_ALGORITHM {
            return Err(WasmBapError::InvalidSignature(format!(
                "unsupported algorithm {}",
                self.algorithm
            )));
        }

        let network = network_of_address(&self.address)?;
        let recovered = recover_signer(&payload.concat(), &self.signature)?;
        Ok(address_from_verifying_key(&recovered, network) == self.address)
    }
}

/// Something that can attach an AIP signature to a payload
pub trait PayloadSigner {
    /// Address the signatures are expected to carry
    fn address(&self) -> &str;

    fn sign_payload(&self, payload: &EncodedPayload) -> Result<SignatureBlock, WasmBapError>;
}

/// BITCOIN_ECDSA signer backed by a secp256k1 private key
#[derive(Clone)]
pub struct AipSigner {
    signing_key: SigningKey,
    address: String,
}

impl fmt::Debug for AipSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AipSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl AipSigner {
    pub fn new(signing_key: SigningKey, network: Network) -> AipSigner {
        let address = address_from_verifying_key(signing_key.verifying_key(), network);
        AipSigner {
            signing_key,
            address,
        }
    }

    pub fn from_derived(derived: &DerivedKey) -> AipSigner {
        AipSigner::new(derived.signing_key().clone(), derived.network())
    }
}

impl PayloadSigner for AipSigner {
    fn address(&self) -> &str {
        &self.address
    }

    fn sign_payload(&self, payload: &EncodedPayload) -> Result<SignatureBlock, WasmBapError> {
        let signature = sign_bitcoin_message(&self.signing_key, &payload.concat())?;
        log::debug!(
            "signed {} payload with {}",
            payload.record_type(),
            self.address
        );
        Ok(SignatureBlock::new(
            AIP_ALGORITHM,
            &self.address,
            signature.to_vec(),
        ))
    }
}

/// Sign `payload` with a raw key on the given network
pub fn sign_payload(
    signing_key: &SigningKey,
    network: Network,
    payload: &EncodedPayload,
) -> Result<SignatureBlock, WasmBapError> {
    AipSigner::new(signing_key.clone(), network).sign_payload(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_attestation, encode_identity};
    use crate::keys::tests::{ENTITY_ADDRESS, ENTITY_SIGNING_KEY};
    use crate::keys::signing_key_from_bytes;
    use crate::message::COMPACT_SIGNATURE_LEN;

    fn entity_key() -> SigningKey {
        signing_key_from_bytes(&hex::decode(ENTITY_SIGNING_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_sign_payload_block() {
        let payload = encode_identity("idkey", ENTITY_ADDRESS);
        let block = sign_payload(&entity_key(), Network::Main, &payload).unwrap();

        assert_eq!(block.protocol_prefix(), AIP_PREFIX);
        assert_eq!(block.algorithm(), AIP_ALGORITHM);
        assert_eq!(block.address(), ENTITY_ADDRESS);
        assert_eq!(block.signature().len(), COMPACT_SIGNATURE_LEN);
        assert!(block.ensure_address(ENTITY_ADDRESS).is_ok());
        assert!(block.verify(&payload).unwrap());
    }

    #[test]
    fn test_signature_self_consistency() {
        let payload = encode_attestation(&[0x55u8; 32]);
        let signer = AipSigner::new(entity_key(), Network::Main);
        let block = signer.sign_payload(&payload).unwrap();

        let recovered = recover_signer(&payload.concat(), block.signature()).unwrap();
        assert_eq!(
            address_from_verifying_key(&recovered, Network::Main),
            block.address()
        );
    }

    #[test]
    fn test_ensure_address_mismatch() {
        let payload = encode_attestation(&[0u8; 32]);
        let block = sign_payload(&entity_key(), Network::Main, &payload).unwrap();
        let err = block
            .ensure_address("1A9VQqdNJrvVF73nf879n2fES6cd5nWNid")
            .unwrap_err();
        assert_eq!(
            err,
            WasmBapError::AddressMismatch {
                expected: "1A9VQqdNJrvVF73nf879n2fES6cd5nWNid".to_string(),
                actual: ENTITY_ADDRESS.to_string(),
            }
        );
    }

    #[test]
    fn test_verify_detects_tampered_payload() {
        let payload = encode_attestation(&[1u8; 32]);
        let block = sign_payload(&entity_key(), Network::Main, &payload).unwrap();
        assert!(!block.verify(&encode_attestation(&[2u8; 32])).unwrap());
    }

    #[test]
    fn test_fields_round_trip_through_cells() {
        let payload = encode_identity("idkey", ENTITY_ADDRESS);
        let block = sign_payload(&entity_key(), Network::Main, &payload).unwrap();
        let fields = block.fields();

        let parsed = SignatureBlock::from_cells(&fields[0], &fields[1], &fields[2], &fields[3])
            .unwrap();
        assert_eq!(parsed, block);
        assert!(SignatureBlock::from_cells(b"nope", &fields[1], &fields[2], &fields[3]).is_err());
        assert!(SignatureBlock::from_cells(&fields[0], &fields[1], &fields[2], b"!!").is_err());
    }
}
