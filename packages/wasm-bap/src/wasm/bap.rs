//! WASM bindings for BAP records
//!
//! BapNamespace provides static methods for creating and decoding records

use crate::bap::{create_alias, create_attestation, create_identity, create_revocation};
use crate::decode::{decode_record, find_record, find_signature, Cell, Tape};
use crate::error::WasmBapError;
use crate::keys::{derive_keys, random_id_key, signing_key_from_bytes};
use crate::record::UrnHash;
use crate::urn::build_attestation_hash;
use crate::wasm::try_into_js_value::TryIntoJsValue;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Namespace for BAP operations
#[wasm_bindgen]
pub struct BapNamespace;

#[wasm_bindgen]
impl BapNamespace {
    /// Derive the signing key at `m/0/<counter>` of a base58 xprv
    ///
    /// # Returns
    /// `{ address, path, privateKey }` with the private key as a Uint8Array
    #[wasm_bindgen(js_name = deriveKeys)]
    pub fn derive_keys(master_key: &str, counter: u32) -> Result<JsValue, JsValue> {
        let derived = derive_keys(master_key, counter)?;
        Ok(derived.try_to_js_value()?)
    }

    /// Create a signed ID record
    ///
    /// # Returns
    /// Locking script bytes of the data output
    #[wasm_bindgen(js_name = createIdentity)]
    pub fn create_identity(
        master_key: &str,
        id_key: &str,
        counter: u32,
    ) -> Result<Vec<u8>, JsValue> {
        let output = create_identity(master_key, id_key, counter)?;
        Ok(output.script().to_vec())
    }

    /// Create a signed ATTEST record
    ///
    /// # Arguments
    /// * `private_key` - 32 byte secp256k1 private key
    #[wasm_bindgen(js_name = createAttestation)]
    pub fn create_attestation(
        id_key: &str,
        private_key: &[u8],
        attribute_name: &str,
        attribute_value: &str,
        secret: &str,
    ) -> Result<Vec<u8>, JsValue> {
        let signing_key = signing_key_from_bytes(private_key)?;
        let output = create_attestation(
            id_key,
            &signing_key,
            attribute_name,
            attribute_value,
            secret,
        )?;
        Ok(output.script().to_vec())
    }

    /// Create a signed REVOKE record
    #[wasm_bindgen(js_name = createRevocation)]
    pub fn create_revocation(
        private_key: &[u8],
        urn_hash: &[u8],
        sequence: u64,
    ) -> Result<Vec<u8>, JsValue> {
        let signing_key = signing_key_from_bytes(private_key)?;
        let output = create_revocation(&signing_key, &urn_hash_from_bytes(urn_hash)?, sequence)?;
        Ok(output.script().to_vec())
    }

    /// Create a signed ALIAS record
    #[wasm_bindgen(js_name = createAlias)]
    pub fn create_alias(private_key: &[u8], id_key: &str, profile: &str) -> Result<Vec<u8>, JsValue> {
        let signing_key = signing_key_from_bytes(private_key)?;
        let output = create_alias(&signing_key, id_key, profile)?;
        Ok(output.script().to_vec())
    }

    /// URN hash of an attribute attestation
    #[wasm_bindgen(js_name = buildAttestationHash)]
    pub fn build_attestation_hash(
        id_key: &str,
        attribute_name: &str,
        attribute_value: &str,
        secret: &str,
    ) -> Result<Vec<u8>, JsValue> {
        let hash = build_attestation_hash(id_key, attribute_name, attribute_value, secret)?;
        Ok(hash.to_vec())
    }

    /// Decode a record from an array of cells
    ///
    /// Each cell is a string, a Uint8Array, or null/undefined for an empty
    /// push. `cells[0]` is the BAP prefix.
    #[wasm_bindgen(js_name = decodeRecord)]
    pub fn decode_record(cells: Array) -> Result<JsValue, JsValue> {
        let record = decode_record(&cells_from_js(&cells)?)?;
        Ok(record.try_to_js_value()?)
    }

    /// Decode the first BAP record found in an array of tapes
    #[wasm_bindgen(js_name = findRecord)]
    pub fn find_record(tapes: Array) -> Result<JsValue, JsValue> {
        let record = find_record(&tapes_from_js(&tapes)?)?;
        Ok(record.try_to_js_value()?)
    }

    /// First AIP signature block in an array of tapes, or undefined
    #[wasm_bindgen(js_name = findSignature)]
    pub fn find_signature(tapes: Array) -> Result<JsValue, JsValue> {
        let signature = find_signature(&tapes_from_js(&tapes)?)?;
        Ok(signature.try_to_js_value()?)
    }

    /// Fresh random identity key (64 hex characters)
    #[wasm_bindgen(js_name = randomIdKey)]
    pub fn random_id_key() -> Result<String, JsValue> {
        Ok(random_id_key()?)
    }
}

fn urn_hash_from_bytes(bytes: &[u8]) -> Result<UrnHash, WasmBapError> {
    bytes.try_into().map_err(|_| {
        WasmBapError::InvalidInput(format!("urn hash must be 32 bytes, got {}", bytes.len()))
    })
}

fn cell_from_js(value: &JsValue) -> Result<Cell, WasmBapError> {
    if value.is_null() || value.is_undefined() {
        return Ok(Cell::empty());
    }
    if let Some(text) = value.as_string() {
        return Ok(Cell::new(text.into_bytes()));
    }
    if let Some(bytes) = value.dyn_ref::<Uint8Array>() {
        return Ok(Cell::new(bytes.to_vec()));
    }
    Err(WasmBapError::InvalidInput(
        "cell must be a string, Uint8Array or null".to_string(),
    ))
}

fn cells_from_js(cells: &Array) -> Result<Vec<Cell>, WasmBapError> {
    cells.iter().map(|value| cell_from_js(&value)).collect()
}

fn tapes_from_js(tapes: &Array) -> Result<Vec<Tape>, WasmBapError> {
    tapes
        .iter()
        .map(|value| {
            let cells = value
                .dyn_ref::<Array>()
                .ok_or_else(|| WasmBapError::InvalidInput("tape must be an array".to_string()))?;
            Ok(Tape::new(cells_from_js(cells)?))
        })
        .collect()
}

// WASM tests - only run in wasm32 target
#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::constants::BAP_PREFIX;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_cell_from_js() {
        assert_eq!(cell_from_js(&JsValue::NULL).unwrap(), Cell::empty());
        assert_eq!(cell_from_js(&"ID".into()).unwrap(), Cell::from("ID"));
        let bytes = Uint8Array::from(&[1u8, 2][..]);
        assert_eq!(cell_from_js(&bytes.into()).unwrap(), Cell::new(vec![1u8, 2]));
        assert!(cell_from_js(&JsValue::from_f64(1.0)).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_record_from_js() {
        let cells = Array::new();
        cells.push(&BAP_PREFIX.into());
        cells.push(&"ALIAS".into());
        cells.push(&"idkey".into());
        cells.push(&"{}".into());
        let record = BapNamespace::decode_record(cells).unwrap();
        let record_type = js_sys::Reflect::get(&record, &"type".into()).unwrap();
        assert_eq!(record_type.as_string().as_deref(), Some("ALIAS"));
    }

    #[wasm_bindgen_test]
    fn test_find_record_not_found() {
        let tapes = Array::new();
        tapes.push(&Array::of1(&"other".into()));
        assert!(BapNamespace::find_record(tapes).is_err());
    }
}
