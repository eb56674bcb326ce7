//! Typed BAP records

use std::fmt;

/// SHA-256 digest of an attestation URN
pub type UrnHash = [u8; 32];

/// The closed set of BAP record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Id,
    Attest,
    Revoke,
    Alias,
}

impl RecordType {
    pub const ALL: [RecordType; 4] = [
        RecordType::Id,
        RecordType::Attest,
        RecordType::Revoke,
        RecordType::Alias,
    ];

    /// Tag as it appears on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Id => "ID",
            RecordType::Attest => "ATTEST",
            RecordType::Revoke => "REVOKE",
            RecordType::Alias => "ALIAS",
        }
    }

    /// Exact, case-sensitive match on the wire tag
    pub fn from_tag(tag: &str) -> Option<RecordType> {
        RecordType::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Fields that always follow the tag; ATTEST and REVOKE may add a sequence
    pub fn required_fields(self) -> usize {
        match self {
            RecordType::Id | RecordType::Alias => 2,
            RecordType::Attest | RecordType::Revoke => 1,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded BAP record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BapRecord {
    /// Binds an identity key to its current signing address
    Identity { id_key: String, address: String },
    /// Attests to an attribute URN hash
    Attestation { urn_hash: UrnHash, sequence: u64 },
    /// Revokes an earlier attestation
    Revocation { urn_hash: UrnHash, sequence: u64 },
    /// Points an identity key at a profile document
    Alias { id_key: String, profile: String },
}

impl BapRecord {
    pub fn record_type(&self) -> RecordType {
        match self {
            BapRecord::Identity { .. } => RecordType::Id,
            BapRecord::Attestation { .. } => RecordType::Attest,
            BapRecord::Revocation { .. } => RecordType::Revoke,
            BapRecord::Alias { .. } => RecordType::Alias,
        }
    }

    pub fn id_key(&self) -> Option<&str> {
        match self {
            BapRecord::Identity { id_key, .. } | BapRecord::Alias { id_key, .. } => Some(id_key),
            BapRecord::Attestation { .. } | BapRecord::Revocation { .. } => None,
        }
    }

    pub fn urn_hash(&self) -> Option<&UrnHash> {
        match self {
            BapRecord::Attestation { urn_hash, .. } | BapRecord::Revocation { urn_hash, .. } => {
                Some(urn_hash)
            }
            BapRecord::Identity { .. } | BapRecord::Alias { .. } => None,
        }
    }

    pub fn sequence(&self) -> Option<u64> {
        match self {
            BapRecord::Attestation { sequence, .. } | BapRecord::Revocation { sequence, .. } => {
                Some(*sequence)
            }
            BapRecord::Identity { .. } | BapRecord::Alias { .. } => None,
        }
    }
}
