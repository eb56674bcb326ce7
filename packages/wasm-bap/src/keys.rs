//! Identity signing keys
//!
//! Every BAP signing key descends from a caller-owned master xprv along the
//! fixed path `m/0/N`, where `N` is the identity counter. Addresses are plain
//! compressed-key P2PKH addresses.

use crate::constants::{IDENTITY_BRANCH, MAINNET_P2PKH_VERSION, TESTNET_P2PKH_VERSION};
use crate::error::WasmBapError;
use bip32::{ChildNumber, XPrv};
use k256::ecdsa::{SigningKey, VerifyingKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Network kind, selects the P2PKH version byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Main,
    Test,
}

impl Network {
    pub fn p2pkh_version(self) -> u8 {
        match self {
            Network::Main => MAINNET_P2PKH_VERSION,
            Network::Test => TESTNET_P2PKH_VERSION,
        }
    }

    pub fn from_p2pkh_version(version: u8) -> Option<Network> {
        match version {
            MAINNET_P2PKH_VERSION => Some(Network::Main),
            TESTNET_P2PKH_VERSION => Some(Network::Test),
            _ => None,
        }
    }
}

/// Path of the identity key for a counter, e.g. `m/0/7`
pub fn identity_path(counter: u32) -> String {
    format!("m/{}/{}", IDENTITY_BRANCH, counter)
}

/// Master extended private key (xprv/tprv)
#[derive(Clone)]
pub struct MasterKey {
    xprv: XPrv,
    network: Network,
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl MasterKey {
    /// Parse a base58 extended private key. `tprv` keys select testnet.
    pub fn from_base58(base58_str: &str) -> Result<MasterKey, WasmBapError> {
        if base58_str.is_empty() {
            return Err(WasmBapError::KeyDerivation {
                path: "m".to_string(),
                reason: "missing master key".to_string(),
            });
        }

        let xprv = XPrv::from_str(base58_str).map_err(|e| WasmBapError::KeyDerivation {
            path: "m".to_string(),
            reason: format!("invalid extended private key: {}", e),
        })?;

        let network = if base58_str.starts_with('t') {
            Network::Test
        } else {
            Network::Main
        };

        Ok(MasterKey { xprv, network })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Derive the identity key at `m/0/counter`
    pub fn derive(&self, counter: u32) -> Result<DerivedKey, WasmBapError> {
        let path = identity_path(counter);

        let branch = derive_child(&self.xprv, IDENTITY_BRANCH, &path)?;
        let child = derive_child(&branch, counter, &path)?;

        let signing_key = child.private_key().clone();
        let address = address_from_verifying_key(signing_key.verifying_key(), self.network);
        log::debug!("derived identity key {} -> {}", path, address);

        Ok(DerivedKey {
            signing_key,
            address,
            path,
            network: self.network,
        })
    }
}

fn derive_child(parent: &XPrv, index: u32, path: &str) -> Result<XPrv, WasmBapError> {
    let child_number =
        ChildNumber::new(index, false).map_err(|e| WasmBapError::KeyDerivation {
            path: path.to_string(),
            reason: format!("invalid child number {}: {}", index, e),
        })?;

    parent
        .derive_child(child_number)
        .map_err(|e| WasmBapError::KeyDerivation {
            path: path.to_string(),
            reason: e.to_string(),
        })
}

/// A freshly derived signing key and its address
#[derive(Clone)]
pub struct DerivedKey {
    signing_key: SigningKey,
    address: String,
    path: String,
    network: Network,
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("address", &self.address)
            .field("path", &self.path)
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl DerivedKey {
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn private_key_bytes(&self) -> [u8; 32] {
        let mut result = [0u8; 32];
        result.copy_from_slice(&self.signing_key.to_bytes());
        result
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(self.private_key_bytes())
    }
}

/// Parse `master_key` and derive the identity key for `counter`
pub fn derive_keys(master_key: &str, counter: u32) -> Result<DerivedKey, WasmBapError> {
    MasterKey::from_base58(master_key)?.derive(counter)
}

/// Build a signing key from 32 raw bytes
pub fn signing_key_from_bytes(private_key: &[u8]) -> Result<SigningKey, WasmBapError> {
    if private_key.len() != 32 {
        return Err(WasmBapError::InvalidInput(
            "Private key must be 32 bytes".to_string(),
        ));
    }

    SigningKey::from_slice(private_key)
        .map_err(|e| WasmBapError::InvalidInput(format!("Invalid private key: {}", e)))
}

/// P2PKH address of a compressed public key
pub fn address_from_verifying_key(verifying_key: &VerifyingKey, network: Network) -> String {
    let pubkey_bytes = verifying_key.to_sec1_bytes();
    let sha256_hash = Sha256::digest(&pubkey_bytes);
    let hash160 = Ripemd160::digest(sha256_hash);

    let mut data = Vec::with_capacity(21);
    data.push(network.p2pkh_version());
    data.extend_from_slice(&hash160);

    bs58::encode(&data).with_check().into_string()
}

/// Network of a base58check P2PKH address
pub fn network_of_address(address: &str) -> Result<Network, WasmBapError> {
    let decoded = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| WasmBapError::InvalidInput(format!("Invalid address {}: {}", address, e)))?;

    if decoded.len() != 21 {
        return Err(WasmBapError::InvalidInput(format!(
            "Invalid address length for {}",
            address
        )));
    }

    Network::from_p2pkh_version(decoded[0]).ok_or_else(|| {
        WasmBapError::InvalidInput(format!("Unsupported address version {}", decoded[0]))
    })
}

/// Fresh random identity key: 32 bytes from the OS CSPRNG, hex encoded
pub fn random_id_key() -> Result<String, WasmBapError> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| WasmBapError::RandomSource(e.to_string()))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const MASTER_XPRV: &str = "xprv9s21ZrQH143K2beTKhLXFRWWFwH8jkwUssjk3SVTiApgmge7kNC3jhVc4NgHW8PhW2y7BCDErqnKpKuyQMjqSePPJooPJowAz5BVLThsv6c";
    pub const ENTITY_XPRV: &str = "xprv9s21ZrQH143K3PZSwbEeXEYq74EbnfMngzAiMCZcfjzyRpUvt2vQJnaHRTZjeuEmLXeN6BzYRoFsEckfobxE9XaRzeLGfQoxzPzTRyRb6oE";
    pub const ENTITY_SIGNING_KEY: &str =
        "127d0ab318252b4622d8eac61407359a4cab7c1a5d67754b5bf9db910eaf052c";
    pub const ENTITY_ADDRESS: &str = "1AFc9feffQmxT61iEftzkaYvWTgLCyU6j";
    pub const TESTNET_TPRV: &str = "tprv8ZgxMBicQKsPeDgjzdC36fs6bMjGApWDNLR9erAXMs5skhMv36j9MV5ecvfavji5khqjWaWSFhN3YcCUUdiKH6isR4Pwy3U5y5egddBr16m";

    #[test]
    fn test_derive_known_entity_key() {
        let derived = derive_keys(ENTITY_XPRV, 0).unwrap();
        assert_eq!(derived.private_key_hex(), ENTITY_SIGNING_KEY);
        assert_eq!(derived.address(), ENTITY_ADDRESS);
        assert_eq!(derived.path(), "m/0/0");
        assert_eq!(derived.network(), Network::Main);
    }

    #[rstest::rstest]
    #[case(
        0,
        "82e87a19422e94210f56829697c29c4a7313042256e08a5b928fd509b38fb7ac",
        "1A9VQqdNJrvVF73nf879n2fES6cd5nWNid"
    )]
    #[case(
        1,
        "28eb48bac80defa1782b961b14f7fda060fa47e4539c066361f30a8f34a11b3d",
        "1G2AKzC4XD9iuQQJhS9WXzXXGXKdEN9DRV"
    )]
    #[case(
        100,
        "802a2d5099f4ff210ee47bc4ff831354bc7da513f4a10e1b6520b71cb7876713",
        "1FXci3k3rdXdQCDwmmhgZND7GKYKmJEiJz"
    )]
    fn test_derive_counter(#[case] counter: u32, #[case] key: &str, #[case] address: &str) {
        let derived = derive_keys(MASTER_XPRV, counter).unwrap();
        assert_eq!(derived.private_key_hex(), key);
        assert_eq!(derived.address(), address);
    }

    #[test]
    fn test_derive_testnet_master() {
        let master = MasterKey::from_base58(TESTNET_TPRV).unwrap();
        assert_eq!(master.network(), Network::Test);

        let derived = master.derive(0).unwrap();
        assert_eq!(derived.network(), Network::Test);
        assert_eq!(derived.address(), "mgiHMN7dJsANUWwLfgbiw7hc4kR5xMjPhw");
        assert_eq!(
            derived.private_key_hex(),
            "f26cf12f89ab91aeeb8d7324a22e8ba080829db15c9245414b073a8c342322aa"
        );
        assert_eq!(
            network_of_address(derived.address()).unwrap(),
            Network::Test
        );
    }

    #[test]
    fn test_derive_is_deterministic() {
        let master = MasterKey::from_base58(MASTER_XPRV).unwrap();
        for counter in [0u32, 1, 2, 1000] {
            let a = master.derive(counter).unwrap();
            let b = master.derive(counter).unwrap();
            assert_eq!(a.private_key_bytes(), b.private_key_bytes());
            assert_eq!(a.address(), b.address());
        }
    }

    #[test]
    fn test_derive_rejects_bad_master_key() {
        for bad in ["", "invalid-key", "xprv123"] {
            let err = derive_keys(bad, 0).unwrap_err();
            assert!(matches!(err, WasmBapError::KeyDerivation { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_derive_rejects_hardened_range_counter() {
        let err = derive_keys(MASTER_XPRV, 0x8000_0000).unwrap_err();
        match err {
            WasmBapError::KeyDerivation { path, .. } => assert_eq!(path, "m/0/2147483648"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let derived = derive_keys(ENTITY_XPRV, 0).unwrap();
        let debug = format!("{:?}", derived);
        assert!(!debug.contains(ENTITY_SIGNING_KEY));
        assert!(debug.contains(ENTITY_ADDRESS));
    }

    #[test]
    fn test_address_networks() {
        let key = signing_key_from_bytes(&hex::decode(ENTITY_SIGNING_KEY).unwrap()).unwrap();
        let main = address_from_verifying_key(key.verifying_key(), Network::Main);
        let test = address_from_verifying_key(key.verifying_key(), Network::Test);

        assert_eq!(main, ENTITY_ADDRESS);
        assert_ne!(main, test);
        assert_eq!(network_of_address(&main).unwrap(), Network::Main);
        assert_eq!(network_of_address(&test).unwrap(), Network::Test);
        assert!(network_of_address("not-an-address").is_err());
    }

    #[test]
    fn test_signing_key_from_bytes_length() {
        assert!(signing_key_from_bytes(&[1u8; 31]).is_err());
        assert!(signing_key_from_bytes(&[0u8; 32]).is_err());
        assert!(signing_key_from_bytes(&[1u8; 32]).is_ok());
    }

    #[test]
    fn test_random_id_key() {
        let a = random_id_key().unwrap();
        let b = random_id_key().unwrap();
        assert_eq!(a.len(), 64);
        assert!(hex::decode(&a).is_ok());
        assert_ne!(a, b);
    }
}
