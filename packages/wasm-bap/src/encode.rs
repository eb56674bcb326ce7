//! BAP payload encoding
//!
//! A payload is the ordered list of pushes that gets signed:
//! ```text
//! BAP_PREFIX <TYPE> <field>... "|"
//! ```

use crate::constants::{BAP_PREFIX, PIPE};
use crate::record::{BapRecord, RecordType, UrnHash};

/// Ordered byte fields of an unsigned BAP record
///
/// Fields are fixed once encoded; the signer and the output builder only
/// read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    record_type: RecordType,
    fields: Vec<Vec<u8>>,
}

impl EncodedPayload {
    fn new(record_type: RecordType, body: Vec<Vec<u8>>) -> EncodedPayload {
        let mut fields = Vec::with_capacity(body.len() + 3);
        fields.push(BAP_PREFIX.as_bytes().to_vec());
        fields.push(record_type.as_str().as_bytes().to_vec());
        fields.extend(body);
        fields.push(PIPE.as_bytes().to_vec());

        log::trace!("encoded {} payload with {} fields", record_type, fields.len());
        EncodedPayload {
            record_type,
            fields,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn fields(&self) -> &[Vec<u8>] {
        &self.fields
    }

    /// All fields joined without separators: the signed message
    pub fn concat(&self) -> Vec<u8> {
        self.fields.concat()
    }
}

/// `BAP_PREFIX ID <id_key> <address> |`
pub fn encode_identity(id_key: &str, address: &str) -> EncodedPayload {
    EncodedPayload::new(
        RecordType::Id,
        vec![id_key.as_bytes().to_vec(), address.as_bytes().to_vec()],
    )
}

/// `BAP_PREFIX ATTEST <urn_hash> |`
pub fn encode_attestation(attestation_hash: &UrnHash) -> EncodedPayload {
    EncodedPayload::new(RecordType::Attest, vec![attestation_hash.to_vec()])
}

/// `BAP_PREFIX ATTEST <urn_hash> <sequence> |`
pub fn encode_attestation_with_sequence(
    attestation_hash: &UrnHash,
    sequence: u64,
) -> EncodedPayload {
    EncodedPayload::new(
        RecordType::Attest,
        vec![attestation_hash.to_vec(), sequence.to_string().into_bytes()],
    )
}

/// `BAP_PREFIX REVOKE <urn_hash> [<sequence>] |`
pub fn encode_revocation(attestation_hash: &UrnHash, sequence: Option<u64>) -> EncodedPayload {
    let mut body = vec![attestation_hash.to_vec()];
    if let Some(sequence) = sequence {
        body.push(sequence.to_string().into_bytes());
    }
    EncodedPayload::new(RecordType::Revoke, body)
}

/// `BAP_PREFIX ALIAS <id_key> <profile> |`
pub fn encode_alias(id_key: &str, profile: &str) -> EncodedPayload {
    EncodedPayload::new(
        RecordType::Alias,
        vec![id_key.as_bytes().to_vec(), profile.as_bytes().to_vec()],
    )
}

/// Encode any record; attestations and revocations carry their sequence
pub fn encode_record(record: &BapRecord) -> EncodedPayload {
    match record {
        BapRecord::Identity { id_key, address } => encode_identity(id_key, address),
        BapRecord::Attestation { urn_hash, sequence } => {
            encode_attestation_with_sequence(urn_hash, *sequence)
        }
        BapRecord::Revocation { urn_hash, sequence } => {
            encode_revocation(urn_hash, Some(*sequence))
        }
        BapRecord::Alias { id_key, profile } => encode_alias(id_key, profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(payload: &EncodedPayload) -> Vec<String> {
        payload
            .fields()
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }

    #[test]
    fn test_encode_identity_layout() {
        let payload = encode_identity("idkey", "1address");
        assert_eq!(payload.record_type(), RecordType::Id);
        assert_eq!(
            as_strings(&payload),
            vec![BAP_PREFIX, "ID", "idkey", "1address", "|"]
        );
    }

    #[test]
    fn test_encode_attestation_layout() {
        let hash = [0xabu8; 32];
        let payload = encode_attestation(&hash);
        let fields = payload.fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[1], b"ATTEST");
        assert_eq!(fields[2], hash.to_vec());
        assert_eq!(fields[3], b"|");

        let payload = encode_attestation_with_sequence(&hash, 12);
        assert_eq!(payload.fields()[3], b"12");
        assert_eq!(payload.fields()[4], b"|");
    }

    #[test]
    fn test_encode_revocation_shares_attest_layout() {
        let hash = [0x01u8; 32];
        let attest = encode_attestation(&hash);
        let revoke = encode_revocation(&hash, None);
        assert_eq!(revoke.fields()[1], b"REVOKE");
        assert_eq!(revoke.fields().len(), attest.fields().len());
        assert_eq!(revoke.fields()[2..], attest.fields()[2..]);
    }

    #[test]
    fn test_encode_alias_layout() {
        let payload = encode_alias("idkey", "{\"name\":\"john\"}");
        assert_eq!(
            as_strings(&payload),
            vec![BAP_PREFIX, "ALIAS", "idkey", "{\"name\":\"john\"}", "|"]
        );
    }

    #[test]
    fn test_concat_has_no_separators() {
        let payload = encode_identity("k", "a");
        let expected = format!("{}IDka|", BAP_PREFIX);
        assert_eq!(payload.concat(), expected.into_bytes());
    }

    #[test]
    fn test_encode_record_matches_helpers() {
        let record = BapRecord::Revocation {
            urn_hash: [9u8; 32],
            sequence: 4,
        };
        assert_eq!(encode_record(&record), encode_revocation(&[9u8; 32], Some(4)));
    }
}
