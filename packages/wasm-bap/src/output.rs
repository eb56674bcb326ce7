//! Data-carrying output assembly
//!
//! ```text
//! OP_FALSE OP_RETURN <payload field>... <AIP_PREFIX> <algorithm> <address> <signature>
//! ```

use crate::encode::EncodedPayload;
use crate::error::WasmBapError;
use crate::message::write_varint;
use crate::sign::SignatureBlock;

pub const OP_FALSE: u8 = 0x00;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;

/// Largest payload a direct push opcode can carry
const MAX_DIRECT_PUSH: usize = 75;

/// Minimal push prefix for `data_len` bytes
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, WasmBapError> {
    if data_len <= MAX_DIRECT_PUSH {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xFF {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xFFFF {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xFFFFFFFF {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(WasmBapError::InvalidInput(format!(
            "push of {} bytes is too large",
            data_len
        )))
    }
}

/// Zero-value output whose script carries a signed BAP record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataOutput {
    script: Vec<u8>,
}

impl DataOutput {
    /// Build from raw pushes
    pub fn from_pushes<I, T>(pushes: I) -> Result<DataOutput, WasmBapError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut script = vec![OP_FALSE, OP_RETURN];
        for push in pushes {
            let data = push.as_ref();
            script.extend_from_slice(&push_data_prefix(data.len())?);
            script.extend_from_slice(data);
        }
        Ok(DataOutput { script })
    }

    pub fn satoshis(&self) -> u64 {
        0
    }

    /// Locking script bytes
    pub fn script(&self) -> &[u8] {
        &self.script
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.script)
    }

    /// Transaction-output encoding: value (8 bytes LE), varint length, script
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + 9 + self.script.len());
        out.extend_from_slice(&self.satoshis().to_le_bytes());
        write_varint(&mut out, self.script.len());
        out.extend_from_slice(&self.script);
        out
    }
}

/// Payload fields followed by the signature block, one push each
pub fn build_output(
    payload: &EncodedPayload,
    signature: &SignatureBlock,
) -> Result<DataOutput, WasmBapError> {
    let output = DataOutput::from_pushes(
        payload
            .fields()
            .iter()
            .cloned()
            .chain(signature.fields()),
    )?;
    log::trace!(
        "built {} output, {} script bytes",
        payload.record_type(),
        output.script().len()
    );
    Ok(output)
}
