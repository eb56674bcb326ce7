//! Protocol constants shared by the encoder and decoder

/// Bitcom prefix identifying a Bitcoin Attestation Protocol record
pub const BAP_PREFIX: &str = "1BAPSuaPnfGnSBM3GLV9yhxUdYe4vGbdMT";

/// Bitcom prefix of the Author Identity Protocol signature block
pub const AIP_PREFIX: &str = "15PciHG22SNLQJXMoSUaWVi7WSqc7hCfva";

/// AIP signing algorithm: Bitcoin signed message over secp256k1
pub const AIP_ALGORITHM: &str = "BITCOIN_ECDSA";

/// Delimiter closing the BAP payload before the AIP block
pub const PIPE: &str = "|";

/// First derivation level of every identity signing key (m/0/N)
pub const IDENTITY_BRANCH: u32 = 0;

/// An identity record is signed by the key one step past the current counter
pub const NEXT_KEY_OFFSET: u32 = 1;

/// Prefix, type and two type-specific fields
pub const MIN_RECORD_CELLS: usize = 4;

pub const URN_ID_PREFIX: &str = "urn:bap:id:";
pub const URN_ATTEST_PREFIX: &str = "urn:bap:attest:";

/// P2PKH address version bytes
pub const MAINNET_P2PKH_VERSION: u8 = 0x00;
pub const TESTNET_P2PKH_VERSION: u8 = 0x6f;
