//! wasm-bap: WASM module for the Bitcoin Attestation Protocol
//!
//! This crate provides:
//! - Identity key derivation from a BIP32 master key
//! - Signed ID, ATTEST, REVOKE and ALIAS data outputs (AIP signatures)
//! - Record decoding from tokenized script data
//!
//! # Architecture
//!
//! The crate follows a two-layer architecture:
//! - **Core layer** (`src/*.rs`): Pure Rust logic, no WASM dependencies
//! - **WASM layer** (`src/wasm/*.rs`): Thin wrappers with `#[wasm_bindgen]`

pub mod bap;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod keys;
pub mod message;
pub mod output;
pub mod record;
pub mod sign;
pub mod urn;
pub mod wasm;

// Re-export main types for convenience
pub use bap::{create_alias, create_attestation, create_identity, create_revocation};
pub use decode::{decode_record, find_record, Cell, Tape};
pub use encode::{encode_attestation, encode_identity, EncodedPayload};
pub use error::WasmBapError;
pub use keys::{derive_keys, DerivedKey, MasterKey, Network};
pub use output::DataOutput;
pub use record::{BapRecord, RecordType, UrnHash};
pub use sign::{AipSigner, PayloadSigner, SignatureBlock};
pub use urn::build_attestation_hash;
