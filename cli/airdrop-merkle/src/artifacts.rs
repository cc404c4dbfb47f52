//! On-disk artifacts: the balance input and the commitment, chunk and leaf
//! files written by `build-tree`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::chunked::ChunkedRoot;
use crate::common::{hex_array, hex_encode, hex_hashes, write_file_atomic, Address, Hash};
use crate::error::{AirdropError, Result};
use crate::leaf::{Balance, Leaf, LeafHash};

pub const DEFAULT_BALANCES_FILE: &str = "airdrop-balances.json";
pub const ROOT_FILE: &str = "airdrop-merkle-root.json";
pub const LEAVES_FILE: &str = "airdrop-balance-leaves.json";

pub fn chunk_file_name(index: usize) -> String {
    format!("airdrop-merkle-chunk_{index}.json")
}

/// One entry of the leaves file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafRecord {
    #[serde(with = "hex_array")]
    pub address: Address,
    pub balance: Balance,
    pub index: usize,
    #[serde(with = "hex_array")]
    pub hash: LeafHash,
}

impl From<&Leaf> for LeafRecord {
    fn from(leaf: &Leaf) -> Self {
        Self {
            address: leaf.address,
            balance: leaf.balance,
            index: leaf.index,
            hash: leaf.hash(),
        }
    }
}

impl LeafRecord {
    pub fn leaf(&self) -> Leaf {
        Leaf {
            address: self.address,
            balance: self.balance,
            index: self.index,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct ChunkFile(#[serde(with = "hex_hashes")] Vec<Hash>);

/// Reads the balance file: a JSON object of address to hex balance.
pub fn load_entitlements(path: &Path) -> Result<HashMap<String, String>> {
    let entitlements: HashMap<String, String> = read_json(path)?;
    debug!(path = %path.display(), entries = entitlements.len(), "loaded entitlements");
    Ok(entitlements)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_file_atomic(path, &json)?;
    Ok(())
}

/// A directory holding one chunked build.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    dir: PathBuf,
}

impl ArtifactDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the directory if it does not exist yet.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn root_path(&self) -> PathBuf {
        self.dir.join(ROOT_FILE)
    }

    pub fn leaves_path(&self) -> PathBuf {
        self.dir.join(LEAVES_FILE)
    }

    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.dir.join(chunk_file_name(index))
    }

    pub fn write_root(&self, root: &ChunkedRoot) -> Result<()> {
        write_json(&self.root_path(), root)
    }

    pub fn read_root(&self) -> Result<ChunkedRoot> {
        let root: ChunkedRoot = read_json(&self.root_path())?;
        root.validate()?;
        Ok(root)
    }

    pub fn write_chunk(&self, index: usize, leaves: &[LeafHash]) -> Result<()> {
        write_json(&self.chunk_path(index), &ChunkFile(leaves.to_vec()))
    }

    pub fn read_chunk(&self, index: usize) -> Result<Vec<LeafHash>> {
        let ChunkFile(leaves) = read_json(&self.chunk_path(index))?;
        Ok(leaves)
    }

    pub fn write_leaves(&self, leaves: &[Leaf]) -> Result<()> {
        let records: Vec<LeafRecord> = leaves.iter().map(LeafRecord::from).collect();
        write_json(&self.leaves_path(), &records)
    }

    /// Reads the leaves file and checks every stored hash against its record.
    pub fn read_leaves(&self) -> Result<Vec<LeafRecord>> {
        let records: Vec<LeafRecord> = read_json(&self.leaves_path())?;
        for (position, record) in records.iter().enumerate() {
            if record.index != position {
                return Err(AirdropError::IndexOutOfRange {
                    index: record.index,
                    len: records.len(),
                });
            }
            if record.leaf().hash() != record.hash {
                return Err(AirdropError::InvalidHash {
                    input: hex_encode(record.hash),
                    reason: format!("does not encode leaf {}", record.index),
                });
            }
        }
        Ok(records)
    }
}
