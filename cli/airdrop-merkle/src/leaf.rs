//! Canonical leaf encoding.
//!
//! Entitlements are sorted by address, numbered from zero in that order, and
//! each `(index, address, balance)` triple is hashed as
//! `keccak256(index_be32 ‖ address ‖ balance_be32)`. External verifiers must
//! reproduce exactly these 84 bytes.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::common::{hex_array, hex_encode, parse_address, strip_hex_prefix, Address, Hash};
use crate::error::{AirdropError, Result};

/// Hash of one encoded entitlement record.
pub type LeafHash = Hash;

/// An unsigned 256-bit token amount, stored big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Balance([u8; 32]);

impl Balance {
    /// Builds a balance from big-endian bytes of any width.
    ///
    /// Leading zero bytes are ignored; anything with more than 32 significant
    /// bytes fails with [`AirdropError::EncodingOverflow`].
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self> {
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        let significant = &bytes[first..];
        if significant.len() > 32 {
            return Err(AirdropError::EncodingOverflow {
                bytes: significant.len(),
            });
        }
        let mut out = [0u8; 32];
        out[32 - significant.len()..].copy_from_slice(significant);
        Ok(Self(out))
    }

    /// Parses a hex quantity such as `0x1bc16d674ec80000`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = strip_hex_prefix(s);
        if digits.is_empty() {
            return Err(AirdropError::InvalidBalance {
                input: s.to_string(),
                reason: "no hex digits".to_string(),
            });
        }
        let padded;
        let even = if digits.len() % 2 == 1 {
            padded = format!("0{digits}");
            padded.as_str()
        } else {
            digits
        };
        let bytes = hex::decode(even).map_err(|e| AirdropError::InvalidBalance {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_be_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<u128> for Balance {
    fn from(value: u128) -> Self {
        let mut out = [0u8; 32];
        out[16..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }
}

/// Minimal hex quantity, `0x0` for zero.
impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = hex::encode(self.0);
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            f.write_str("0x0")
        } else {
            write!(f, "0x{trimmed}")
        }
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Balance::from_hex(&s).map_err(D::Error::custom)
    }
}

/// One parsed `(address, balance)` pair from the source map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    pub address: Address,
    pub balance: Balance,
}

impl Entitlement {
    pub fn parse(address: &str, balance: &str) -> Result<Self> {
        Ok(Self {
            address: parse_address(address)?,
            balance: Balance::from_hex(balance)?,
        })
    }
}

/// An entitlement together with its rank in address order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    #[serde(with = "hex_array")]
    pub address: Address,
    pub balance: Balance,
    pub index: usize,
}

impl Leaf {
    /// The leaf hash committed to by the tree.
    pub fn hash(&self) -> LeafHash {
        hash_leaf(self.index, &self.address, &self.balance)
    }
}

fn hash_leaf(index: usize, address: &Address, balance: &Balance) -> LeafHash {
    let mut index_word = [0u8; 32];
    let index_bytes = index.to_be_bytes();
    index_word[32 - index_bytes.len()..].copy_from_slice(&index_bytes);

    Keccak256::new()
        .chain_update(index_word)
        .chain_update(address)
        .chain_update(balance.as_bytes())
        .finalize()
        .into()
}

/// Hashes one entitlement record.
///
/// # Arguments
/// * `index` - Rank of the address in sorted order
/// * `address` - 20-byte address
/// * `balance` - Big-endian balance bytes, any width
///
/// # Errors
/// Returns [`AirdropError::EncodingOverflow`] when the balance has more than
/// 256 significant bits. The value is never truncated.
pub fn encode_leaf(index: usize, address: &Address, balance: &[u8]) -> Result<LeafHash> {
    let balance = Balance::from_be_slice(balance)?;
    Ok(hash_leaf(index, address, &balance))
}

/// Parses entitlements and numbers them in ascending address order.
///
/// Addresses are fixed-width hex, so ordering the raw bytes is the same as
/// ordering the lowercase hex strings. The result does not depend on the
/// iteration order of `entitlements`.
pub fn expand_leaves<I, K, V>(entitlements: I) -> Result<Vec<Leaf>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut parsed = entitlements
        .into_iter()
        .map(|(address, balance)| Entitlement::parse(address.as_ref(), balance.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    parsed.sort_unstable_by(|a, b| a.address.cmp(&b.address));

    if let Some(pair) = parsed.windows(2).find(|w| w[0].address == w[1].address) {
        return Err(AirdropError::DuplicateAddress(hex_encode(pair[0].address)));
    }

    Ok(parsed
        .into_iter()
        .enumerate()
        .map(|(index, e)| Leaf {
            address: e.address,
            balance: e.balance,
            index,
        })
        .collect())
}

/// Ordered leaf hashes for an entitlement set; the input to every tree builder.
pub fn get_leaves<I, K, V>(entitlements: I) -> Result<Vec<LeafHash>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let leaves = expand_leaves(entitlements)?;
    leaves
        .iter()
        .map(|leaf| encode_leaf(leaf.index, &leaf.address, leaf.balance.as_bytes()))
        .collect()
}

/// Finds the index of `address` in leaves produced by [`expand_leaves`].
pub fn index_of(leaves: &[Leaf], address: &str) -> Result<usize> {
    let target = parse_address(address)?;
    leaves
        .binary_search_by(|leaf| leaf.address.cmp(&target))
        .map(|pos| leaves[pos].index)
        .map_err(|_| AirdropError::AddressNotFound(address.to_string()))
}
