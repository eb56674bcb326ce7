//! Attestation URN hashing
//!
//! ```text
//! id_urn      = "urn:bap:id:" name ":" value ":" secret
//! attest_urn  = "urn:bap:attest:" hex(sha256(id_urn)) ":" id_key
//! urn_hash    = sha256(attest_urn)
//! ```
//!
//! The inner hash is always rendered as lowercase hex so the result is
//! reproducible in any language.

use crate::constants::{URN_ATTEST_PREFIX, URN_ID_PREFIX};
use crate::error::WasmBapError;
use crate::record::UrnHash;
use sha2::{Digest, Sha256};

pub(crate) fn require(value: &str, field: &'static str) -> Result<(), WasmBapError> {
    if value.is_empty() {
        return Err(WasmBapError::MissingField(field));
    }
    Ok(())
}

/// `urn:bap:id:<name>:<value>:<secret>`
pub fn identity_urn(attribute_name: &str, attribute_value: &str, secret: &str) -> String {
    format!(
        "{}{}:{}:{}",
        URN_ID_PREFIX, attribute_name, attribute_value, secret
    )
}

/// `urn:bap:attest:<hex id urn hash>:<id_key>`
pub fn attestation_urn(id_urn_hash: &UrnHash, id_key: &str) -> String {
    format!(
        "{}{}:{}",
        URN_ATTEST_PREFIX,
        hex::encode(id_urn_hash),
        id_key
    )
}

fn sha256(data: &[u8]) -> UrnHash {
    let mut result = [0u8; 32];
    result.copy_from_slice(&Sha256::digest(data));
    result
}

/// Hash of an attribute attestation for `id_key`
pub fn build_attestation_hash(
    id_key: &str,
    attribute_name: &str,
    attribute_value: &str,
    secret: &str,
) -> Result<UrnHash, WasmBapError> {
    require(id_key, "idKey")?;
    require(attribute_name, "attributeName")?;
    require(secret, "secret")?;

    let id_urn_hash = sha256(identity_urn(attribute_name, attribute_value, secret).as_bytes());
    Ok(sha256(attestation_urn(&id_urn_hash, id_key).as_bytes()))
}
