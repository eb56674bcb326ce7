//! BAP record decoding from tokenized script data
//!
//! Input is a tape: the ordered data pushes of one protocol segment of an
//! output, as produced by an external script tokenizer. A BAP tape looks like
//! ```text
//! [BAP_PREFIX, TYPE, field, field, ...]
//! ```

use crate::constants::{AIP_PREFIX, BAP_PREFIX, MIN_RECORD_CELLS, PIPE};
use crate::error::WasmBapError;
use crate::record::{BapRecord, RecordType, UrnHash};
use crate::sign::SignatureBlock;

/// One pushed data item; `None` when the tokenizer produced no value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    value: Option<Vec<u8>>,
}

impl Cell {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Cell {
        Cell {
            value: Some(bytes.into()),
        }
    }

    pub fn empty() -> Cell {
        Cell { value: None }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// Value as text, when present and valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().map_or(true, |b| b.is_empty())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::new(s.as_bytes())
    }
}

impl From<&[u8]> for Cell {
    fn from(b: &[u8]) -> Self {
        Cell::new(b)
    }
}

impl From<Vec<u8>> for Cell {
    fn from(b: Vec<u8>) -> Self {
        Cell::new(b)
    }
}

impl From<Option<Vec<u8>>> for Cell {
    fn from(value: Option<Vec<u8>>) -> Self {
        Cell { value }
    }
}

/// Ordered cells of one protocol segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Cell>,
}

impl Tape {
    pub fn new(cells: Vec<Cell>) -> Tape {
        Tape { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn position_of(&self, prefix: &str) -> Option<usize> {
        self.cells
            .iter()
            .position(|c| c.bytes() == Some(prefix.as_bytes()))
    }
}

impl FromIterator<Cell> for Tape {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Tape::new(iter.into_iter().collect())
    }
}

/// Decode a BAP record from `cells`, where `cells[0]` is the prefix and
/// `cells[1]` the type tag
pub fn decode_record(cells: &[Cell]) -> Result<BapRecord, WasmBapError> {
    let tag = match cells.get(1).and_then(Cell::bytes) {
        Some(bytes) if !bytes.is_empty() => String::from_utf8_lossy(bytes).into_owned(),
        _ => return Err(WasmBapError::MissingType),
    };

    let record_type =
        RecordType::from_tag(&tag).ok_or_else(|| WasmBapError::UnknownRecordType(tag.clone()))?;

    if cells.len() < MIN_RECORD_CELLS {
        return Err(WasmBapError::malformed(
            record_type.as_str(),
            format!(
                "expected at least {} cells, found {}",
                MIN_RECORD_CELLS,
                cells.len()
            ),
        ));
    }

    let record = match record_type {
        RecordType::Attest => BapRecord::Attestation {
            urn_hash: urn_hash_field(record_type, &cells[2])?,
            sequence: sequence_field(&cells[3])?,
        },
        RecordType::Revoke => BapRecord::Revocation {
            urn_hash: urn_hash_field(record_type, &cells[2])?,
            sequence: sequence_field(&cells[3])?,
        },
        RecordType::Id => BapRecord::Identity {
            id_key: text_field(record_type, &cells[2], "idKey")?,
            address: text_field(record_type, &cells[3], "address")?,
        },
        RecordType::Alias => BapRecord::Alias {
            id_key: text_field(record_type, &cells[2], "idKey")?,
            profile: text_field(record_type, &cells[3], "profile")?,
        },
    };

    log::debug!("decoded {} record", record_type);
    Ok(record)
}

fn text_field(
    record_type: RecordType,
    cell: &Cell,
    name: &str,
) -> Result<String, WasmBapError> {
    match cell.as_str() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        None if !cell.is_empty() => Err(WasmBapError::malformed(
            record_type.as_str(),
            format!("{} is not utf-8", name),
        )),
        _ => Err(WasmBapError::malformed(
            record_type.as_str(),
            format!("missing {}", name),
        )),
    }
}

/// Raw 32-byte digest, or its 64-character hex rendering
fn urn_hash_field(record_type: RecordType, cell: &Cell) -> Result<UrnHash, WasmBapError> {
    let bytes = cell
        .bytes()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| WasmBapError::malformed(record_type.as_str(), "missing urn hash"))?;

    let mut urn_hash = [0u8; 32];
    match bytes.len() {
        32 => urn_hash.copy_from_slice(bytes),
        64 => hex::decode_to_slice(bytes, &mut urn_hash).map_err(|e| {
            WasmBapError::malformed(record_type.as_str(), format!("invalid urn hash: {}", e))
        })?,
        n => {
            return Err(WasmBapError::malformed(
                record_type.as_str(),
                format!("urn hash has {} bytes", n),
            ))
        }
    }
    Ok(urn_hash)
}

/// Strict unsigned decimal: digits only, no sign, no whitespace
fn sequence_field(cell: &Cell) -> Result<u64, WasmBapError> {
    let text = cell.as_str().unwrap_or_default();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WasmBapError::MalformedSequence(text.to_string()));
    }
    text.parse::<u64>()
        .map_err(|_| WasmBapError::MalformedSequence(text.to_string()))
}

/// Decode the first tape that carries the BAP prefix; only one record per
/// transaction is considered
pub fn find_record(tapes: &[Tape]) -> Result<BapRecord, WasmBapError> {
    for tape in tapes {
        if let Some(index) = tape.position_of(BAP_PREFIX) {
            return decode_record(&tape.cells[index..]);
        }
    }
    Err(WasmBapError::NotFound)
}

/// Index of the AIP prefix cell that signs the record in `cells`
///
/// The block must start right after the `|` that closes the BAP record, or
/// at `cells[0]` when a tokenizer split the AIP segment into its own tape.
fn signature_position(cells: &[Cell]) -> Option<usize> {
    let is_aip = |i: usize| {
        cells
            .get(i)
            .and_then(Cell::bytes)
            .is_some_and(|b| b == AIP_PREFIX.as_bytes())
    };
    if is_aip(0) {
        return Some(0);
    }

    let prefix = cells
        .iter()
        .position(|c| c.bytes() == Some(BAP_PREFIX.as_bytes()))?;
    let body = cells
        .get(prefix + 1)
        .and_then(Cell::as_str)
        .and_then(RecordType::from_tag)
        .map_or(0, RecordType::required_fields);

    let search_from = prefix + 2 + body;
    let pipe = search_from
        + cells
            .get(search_from..)?
            .iter()
            .position(|c| c.bytes() == Some(PIPE.as_bytes()))?;

    is_aip(pipe + 1).then_some(pipe + 1)
}

/// Read the AIP block (`AIP_PREFIX algorithm address signature`) that signs
/// the record in `cells`
pub fn decode_signature(cells: &[Cell]) -> Result<Option<SignatureBlock>, WasmBapError> {
    let Some(index) = signature_position(cells) else {
        return Ok(None);
    };

    let block = cells.get(index..index + 4).ok_or_else(|| {
        WasmBapError::InvalidSignature("incomplete AIP signature block".to_string())
    })?;

    let cell = |i: usize| block[i].bytes().unwrap_or_default();
    SignatureBlock::from_cells(cell(0), cell(1), cell(2), cell(3)).map(Some)
}

/// First AIP block in any tape
pub fn find_signature(tapes: &[Tape]) -> Result<Option<SignatureBlock>, WasmBapError> {
    for tape in tapes {
        if let Some(block) = decode_signature(tape.cells())? {
            return Ok(Some(block));
        }
    }
    Ok(None)
}
