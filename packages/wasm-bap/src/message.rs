use crate::error::WasmBapError;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

/// Bitcoin message magic prefix
const BITCOIN_MESSAGE_MAGIC: &[u8] = b"\x18Bitcoin Signed Message:\n";

/// Length of a BIP-137 compact signature
pub const COMPACT_SIGNATURE_LEN: usize = 65;

/// Compute Bitcoin message hash (double SHA256 with magic prefix)
pub fn bitcoin_message_hash(message: &[u8]) -> [u8; 32] {
    // Build the full message: magic + varint(len) + message
    let mut data = Vec::with_capacity(BITCOIN_MESSAGE_MAGIC.len() + 9 + message.len());
    data.extend_from_slice(BITCOIN_MESSAGE_MAGIC);
    write_varint(&mut data, message.len());
    data.extend_from_slice(message);

    // Double SHA256
    let first_hash = Sha256::digest(&data);
    let second_hash = Sha256::digest(first_hash);

    let mut result = [0u8; 32];
    result.copy_from_slice(&second_hash);
    result
}

/// Write a variable-length integer
pub(crate) fn write_varint(data: &mut Vec<u8>, value: usize) {
    if value < 0xfd {
        data.push(value as u8);
    } else if value <= 0xffff {
        data.push(0xfd);
        data.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffffffff {
        data.push(0xfe);
        data.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        data.push(0xff);
        data.extend_from_slice(&(value as u64).to_le_bytes());
    }
}

/// Sign a message using Bitcoin message signing (BIP-137)
/// Returns 65-byte recoverable signature (1-byte header + 64-byte signature)
pub fn sign_bitcoin_message(
    signing_key: &SigningKey,
    message: &[u8],
) -> Result<[u8; COMPACT_SIGNATURE_LEN], WasmBapError> {
    let message_hash = bitcoin_message_hash(message);

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(&message_hash)
        .map_err(|e| WasmBapError::Signing(e.to_string()))?;

    // Header: 27 + recovery_id + 4 (compressed keys only)
    let mut sig_bytes = [0u8; COMPACT_SIGNATURE_LEN];
    sig_bytes[0] = 31 + recovery_id.to_byte();
    sig_bytes[1..].copy_from_slice(&signature.to_bytes());

    Ok(sig_bytes)
}

/// Recover the public key that produced a BIP-137 signature over `message`
pub fn recover_signer(message: &[u8], signature: &[u8]) -> Result<VerifyingKey, WasmBapError> {
    if signature.len() != COMPACT_SIGNATURE_LEN {
        return Err(WasmBapError::InvalidSignature(
            "Signature must be 65 bytes".to_string(),
        ));
    }

    let header = signature[0];
    let r_s = &signature[1..COMPACT_SIGNATURE_LEN];

    // Header values: 27-30 uncompressed, 31-34 compressed
    let recovery_id = if (31..=34).contains(&header) {
        header - 31
    } else if (27..=30).contains(&header) {
        header - 27
    } else {
        return Err(WasmBapError::InvalidSignature(format!(
            "Invalid signature header: {}",
            header
        )));
    };

    let sig = Signature::from_slice(r_s)
        .map_err(|_| WasmBapError::InvalidSignature("Invalid signature format".to_string()))?;

    let recid = RecoveryId::from_byte(recovery_id)
        .ok_or_else(|| WasmBapError::InvalidSignature("Invalid recovery id".to_string()))?;

    let message_hash = bitcoin_message_hash(message);

    VerifyingKey::recover_from_prehash(&message_hash, &sig, recid).map_err(|_| {
        WasmBapError::InvalidSignature("Failed to recover public key from signature".to_string())
    })
}

/// Verify a Bitcoin message signature (BIP-137) against a known key
pub fn verify_bitcoin_message(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, WasmBapError> {
    let recovered_key = recover_signer(message, signature)?;
    Ok(recovered_key == *verifying_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SigningKey {
        SigningKey::from_slice(&[byte; 32]).unwrap()
    }

    #[test]
    fn test_bitcoin_message_hash() {
        // The hash should be deterministic
        let hash1 = bitcoin_message_hash(b"test message");
        let hash2 = bitcoin_message_hash(b"test message");
        assert_eq!(hash1, hash2);

        // Different messages should produce different hashes
        let hash3 = bitcoin_message_hash(b"different message");
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_varint_boundaries() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 0xfc);
        assert_eq!(buf, vec![0xfc]);

        buf.clear();
        write_varint(&mut buf, 0xfd);
        assert_eq!(buf, vec![0xfd, 0xfd, 0x00]);

        buf.clear();
        write_varint(&mut buf, 0x1_0000);
        assert_eq!(buf, vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_sign_and_verify() {
        let signing_key = key(0x01);
        let message = b"Hello, Bitcoin!";
        let signature = sign_bitcoin_message(&signing_key, message).unwrap();

        assert!((31..=34).contains(&signature[0]));
        assert!(verify_bitcoin_message(signing_key.verifying_key(), message, &signature).unwrap());
        assert!(!verify_bitcoin_message(key(0x02).verifying_key(), message, &signature).unwrap());
        assert!(
            !verify_bitcoin_message(signing_key.verifying_key(), b"other", &signature).unwrap()
        );
    }

    #[test]
    fn test_sign_binary_message() {
        let signing_key = key(0x03);
        let message = [0u8, 0xff, 0x7c, 0x80];
        let signature = sign_bitcoin_message(&signing_key, &message).unwrap();
        let recovered = recover_signer(&message, &signature).unwrap();
        assert_eq!(recovered, *signing_key.verifying_key());
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signing_key = key(0x04);
        let a = sign_bitcoin_message(&signing_key, b"same").unwrap();
        let b = sign_bitcoin_message(&signing_key, b"same").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_recover_rejects_bad_signatures() {
        assert!(recover_signer(b"msg", &[0u8; 64]).is_err());

        let mut bad_header = [0u8; 65];
        bad_header[0] = 40;
        assert!(matches!(
            recover_signer(b"msg", &bad_header),
            Err(WasmBapError::InvalidSignature(_))
        ));
    }
}
