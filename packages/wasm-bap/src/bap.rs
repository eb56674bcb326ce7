//! Signed BAP outputs
//!
//! Each operation validates its string arguments, encodes the payload, signs
//! it with AIP, checks the signer address and assembles the data output.

use crate::constants::NEXT_KEY_OFFSET;
use crate::encode::{
    encode_alias, encode_attestation, encode_identity, encode_record, EncodedPayload,
};
use crate::error::WasmBapError;
use crate::keys::{identity_path, MasterKey, Network};
use crate::output::{build_output, DataOutput};
use crate::record::{BapRecord, UrnHash};
use crate::sign::{AipSigner, PayloadSigner};
use crate::urn::{build_attestation_hash, require};
use k256::ecdsa::SigningKey;

/// Sign `payload`, insist the block names `expected_address`, build the output
pub fn sign_and_build<S: PayloadSigner + ?Sized>(
    signer: &S,
    expected_address: &str,
    payload: &EncodedPayload,
) -> Result<DataOutput, WasmBapError> {
    let signature = signer.sign_payload(payload)?;
    signature.ensure_address(expected_address)?;
    build_output(payload, &signature)
}

/// ID record binding `id_key` to the next signing address of `master_key`
///
/// The record is signed by, and names, the key at
/// `m/0/(counter + NEXT_KEY_OFFSET)`.
pub fn create_identity(
    master_key: &str,
    id_key: &str,
    counter: u32,
) -> Result<DataOutput, WasmBapError> {
    require(id_key, "idKey")?;

    let master = MasterKey::from_base58(master_key)?;
    let signing_counter =
        counter
            .checked_add(NEXT_KEY_OFFSET)
            .ok_or_else(|| WasmBapError::KeyDerivation {
                path: identity_path(counter),
                reason: "counter overflow".to_string(),
            })?;
    let derived = master.derive(signing_counter)?;

    log::debug!(
        "creating identity record for counter {} at {}",
        counter,
        derived.path()
    );
    let payload = encode_identity(id_key, derived.address());
    sign_and_build(&AipSigner::from_derived(&derived), derived.address(), &payload)
}

/// ATTEST record over an attribute of `id_key`, signed on mainnet
pub fn create_attestation(
    id_key: &str,
    signing_key: &SigningKey,
    attribute_name: &str,
    attribute_value: &str,
    secret: &str,
) -> Result<DataOutput, WasmBapError> {
    let signer = AipSigner::new(signing_key.clone(), Network::Main);
    create_attestation_with(&signer, id_key, attribute_name, attribute_value, secret)
}

/// ATTEST record signed by any [`PayloadSigner`]
pub fn create_attestation_with<S: PayloadSigner + ?Sized>(
    signer: &S,
    id_key: &str,
    attribute_name: &str,
    attribute_value: &str,
    secret: &str,
) -> Result<DataOutput, WasmBapError> {
    require(id_key, "idKey")?;
    require(attribute_name, "attributeName")?;
    require(attribute_value, "attributeValue")?;
    require(secret, "secret")?;

    let attestation_hash = build_attestation_hash(id_key, attribute_name, attribute_value, secret)?;
    log::debug!("creating attestation {}", hex::encode(attestation_hash));

    let payload = encode_attestation(&attestation_hash);
    sign_and_build(signer, signer.address(), &payload)
}

/// REVOKE record for a previously attested URN hash
pub fn create_revocation(
    signing_key: &SigningKey,
    urn_hash: &UrnHash,
    sequence: u64,
) -> Result<DataOutput, WasmBapError> {
    let signer = AipSigner::new(signing_key.clone(), Network::Main);
    create_record(
        &signer,
        &BapRecord::Revocation {
            urn_hash: *urn_hash,
            sequence,
        },
    )
}

/// ALIAS record pointing `id_key` at a profile document
pub fn create_alias(
    signing_key: &SigningKey,
    id_key: &str,
    profile: &str,
) -> Result<DataOutput, WasmBapError> {
    require(id_key, "idKey")?;
    require(profile, "profile")?;

    let signer = AipSigner::new(signing_key.clone(), Network::Main);
    let payload = encode_alias(id_key, profile);
    sign_and_build(&signer, signer.address(), &payload)
}

/// Sign and build any record
pub fn create_record<S: PayloadSigner + ?Sized>(
    signer: &S,
    record: &BapRecord,
) -> Result<DataOutput, WasmBapError> {
    let payload = encode_record(record);
    sign_and_build(signer, signer.address(), &payload)
}
