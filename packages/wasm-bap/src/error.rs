//! Error types for wasm-bap

use wasm_bindgen::prelude::*;

/// Main error type for wasm-bap operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WasmBapError {
    /// A required string argument was empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The master key could not be parsed or the path could not be derived
    #[error("key derivation failed at {path}: {reason}")]
    KeyDerivation { path: String, reason: String },

    /// The ECDSA primitive rejected the key or message
    #[error("signing failed: {0}")]
    Signing(String),

    /// The signature block names a different address than the one expected
    #[error("failed signing, addresses don't match {expected} vs {actual}")]
    AddressMismatch { expected: String, actual: String },

    /// A signature could not be parsed or recovered
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The type cell of a record is absent or empty
    #[error("missing BAP record type")]
    MissingType,

    /// A known record type with missing or unusable fields
    #[error("invalid {record_type} record: {reason}")]
    MalformedRecord { record_type: String, reason: String },

    /// The sequence cell is not a non-negative decimal integer
    #[error("invalid sequence number: {0:?}")]
    MalformedSequence(String),

    /// The type cell names something other than ID, ATTEST, REVOKE or ALIAS
    #[error("unknown BAP record type: {0}")]
    UnknownRecordType(String),

    /// None of the tapes carry the BAP prefix
    #[error("no BAP record found")]
    NotFound,

    /// The platform random number generator failed
    #[error("random source unavailable: {0}")]
    RandomSource(String),

    /// Caller supplied input that could not be interpreted
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl WasmBapError {
    pub(crate) fn malformed(record_type: &str, reason: impl Into<String>) -> Self {
        WasmBapError::MalformedRecord {
            record_type: record_type.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the input is most likely not a BAP record at all
    pub fn is_not_bap(&self) -> bool {
        matches!(
            self,
            WasmBapError::UnknownRecordType(_) | WasmBapError::NotFound
        )
    }

    /// True when the input claims to be BAP but is corrupt
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            WasmBapError::MissingType
                | WasmBapError::MalformedRecord { .. }
                | WasmBapError::MalformedSequence(_)
        )
    }
}

impl From<k256::ecdsa::Error> for WasmBapError {
    fn from(err: k256::ecdsa::Error) -> Self {
        WasmBapError::Signing(err.to_string())
    }
}

impl From<hex::FromHexError> for WasmBapError {
    fn from(err: hex::FromHexError) -> Self {
        WasmBapError::InvalidInput(format!("invalid hex: {}", err))
    }
}

// Converts to JS Error with stack trace
impl From<WasmBapError> for JsValue {
    fn from(err: WasmBapError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
