//! WASM bindings for wasm-bap
//!
//! This module contains thin wrappers with #[wasm_bindgen] that delegate
//! to the core Rust implementations.

pub mod bap;
pub mod try_into_js_value;

// Re-export WASM types
pub use bap::BapNamespace;
