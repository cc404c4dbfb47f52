use sha3::{Digest, Keccak256};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{AirdropError, Result};

/// A 32-byte Keccak-256 digest: leaf hashes, tree nodes and roots.
pub type Hash = [u8; 32];

/// A 20-byte account address.
pub type Address = [u8; 20];

/// Strips an optional `0x`/`0X` prefix and surrounding whitespace.
pub fn strip_hex_prefix(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Parses an address from a hex string.
///
/// # Arguments
/// * `addr_str` - The address string, with or without "0x" prefix, any case
///
/// # Returns
/// A 20-byte array representing the address
///
/// # Errors
/// Returns [`AirdropError::InvalidAddress`] if the address is not 40 hex
/// characters or contains invalid hex
pub fn parse_address(addr_str: &str) -> Result<Address> {
    let cleaned = strip_hex_prefix(addr_str);
    let invalid = |reason: String| AirdropError::InvalidAddress {
        input: addr_str.to_string(),
        reason,
    };
    if cleaned.len() != 40 {
        return Err(invalid(format!(
            "expected 40 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut address = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut address).map_err(|e| invalid(e.to_string()))?;
    Ok(address)
}

/// Parses a 32-byte hash from a hex string with or without "0x" prefix.
///
/// # Errors
/// Returns [`AirdropError::InvalidHash`] unless the input is 64 hex characters
pub fn parse_hash(hash_str: &str) -> Result<Hash> {
    let cleaned = strip_hex_prefix(hash_str);
    let invalid = |reason: String| AirdropError::InvalidHash {
        input: hash_str.to_string(),
        reason,
    };
    if cleaned.len() != 64 {
        return Err(invalid(format!(
            "expected 64 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash).map_err(|e| invalid(e.to_string()))?;
    Ok(hash)
}

/// Encodes bytes as lowercase hex with a "0x" prefix.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Keccak-256 over a single byte string.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Computes a Keccak256 hash of two 32-byte values concatenated.
///
/// # Arguments
/// * `left` - First 32-byte value
/// * `right` - Second 32-byte value
///
/// # Returns
/// 32-byte hash result
pub fn keccak256_hash(left: Hash, right: Hash) -> Hash {
    let hash = Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize();
    hash.into()
}

/// Writes `contents` to `path` through a temporary sibling file and a rename,
/// so readers never observe a half-written artifact.
pub fn write_file_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    fs::rename(&temp_path, path)
}

/// Serde adapter for fixed-size byte arrays as `0x` hex strings.
pub mod hex_array {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::hex_encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let cleaned = super::strip_hex_prefix(&s);
        let mut out = [0u8; N];
        hex::decode_to_slice(cleaned, &mut out).map_err(D::Error::custom)?;
        Ok(out)
    }
}

/// Serde adapter for sequences of hashes as arrays of `0x` hex strings.
pub mod hex_hashes {
    use super::Hash;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(hashes: &[Hash], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(hashes.iter().map(super::hex_encode))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Hash>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| super::parse_hash(s).map_err(D::Error::custom))
            .collect()
    }
}
