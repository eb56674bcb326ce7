//! Rust to JavaScript value conversion
//!
//! Records and key material cross the boundary through the TryIntoJsValue
//! trait rather than serde derives, so the core types stay free of
//! serialization attributes.

use crate::keys::DerivedKey;
use crate::record::BapRecord;
use crate::sign::SignatureBlock;
use wasm_bindgen::prelude::*;

/// Error type for JS conversion failures
#[derive(Debug, Clone)]
pub struct JsConversionError(String);

impl JsConversionError {
    pub fn new(msg: &str) -> Self {
        JsConversionError(msg.to_string())
    }
}

impl std::fmt::Display for JsConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<JsConversionError> for JsValue {
    fn from(err: JsConversionError) -> Self {
        js_sys::Error::new(&err.0).into()
    }
}

/// Trait for converting Rust types to JavaScript values
pub trait TryIntoJsValue {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError>;
}

impl TryIntoJsValue for String {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_str(self))
    }
}

impl TryIntoJsValue for &str {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_str(self))
    }
}

impl TryIntoJsValue for u64 {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        // Convert to BigInt to avoid precision loss
        Ok(js_sys::BigInt::from(*self).into())
    }
}

impl TryIntoJsValue for [u8; 32] {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(js_sys::Uint8Array::from(&self[..]).into())
    }
}

impl<T: TryIntoJsValue> TryIntoJsValue for Option<T> {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        match self {
            Some(v) => v.try_to_js_value(),
            None => Ok(JsValue::undefined()),
        }
    }
}

/// Macro for building JavaScript objects
#[macro_export]
macro_rules! js_obj {
    ( $( $key:expr => $value:expr ),* $(,)? ) => {{
        use $crate::wasm::try_into_js_value::{TryIntoJsValue, JsConversionError};
        let obj = js_sys::Object::new();
        $(
            js_sys::Reflect::set(
                &obj,
                &wasm_bindgen::JsValue::from_str($key),
                &TryIntoJsValue::try_to_js_value(&$value)?
            ).map_err(|_| JsConversionError::new(&format!("Failed to set property: {}", $key)))?;
        )*
        Ok::<wasm_bindgen::JsValue, JsConversionError>(obj.into())
    }};
}

impl TryIntoJsValue for BapRecord {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        let record_type = self.record_type().as_str();
        match self {
            BapRecord::Identity { id_key, address } => js_obj!(
                "type" => record_type,
                "idKey" => id_key.clone(),
                "address" => address.clone(),
            ),
            BapRecord::Attestation { urn_hash, sequence }
            | BapRecord::Revocation { urn_hash, sequence } => js_obj!(
                "type" => record_type,
                "urnHash" => hex::encode(urn_hash),
                "sequence" => *sequence,
            ),
            BapRecord::Alias { id_key, profile } => js_obj!(
                "type" => record_type,
                "idKey" => id_key.clone(),
                "profile" => profile.clone(),
            ),
        }
    }
}

impl TryIntoJsValue for SignatureBlock {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "prefix" => self.protocol_prefix(),
            "algorithm" => self.algorithm(),
            "address" => self.address(),
            "signature" => self.signature_base64(),
        )
    }
}

impl TryIntoJsValue for DerivedKey {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "address" => self.address(),
            "path" => self.path(),
            "privateKey" => self.private_key_bytes(),
        )
    }
}
