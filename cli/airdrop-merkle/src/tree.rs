use tracing::debug;

use crate::chunked::{build_chunked_root, ChunkedTree};
use crate::common::{hex_encode, Hash};
use crate::error::{AirdropError, Result};
use crate::leaf::{expand_leaves, index_of, Leaf, LeafHash};
use crate::proof::{plain_proof, Proof};
use crate::reduce::reduce_to_root;
use crate::verify::verify;

/// Root of the full, unchunked tree over `leaves`.
///
/// Chunked builds must agree with this value bit for bit.
pub fn build_root(leaves: &[LeafHash]) -> Result<Hash> {
    reduce_to_root(leaves)
}

/// An entitlement set with its leaves and commitment.
///
/// The root is computed once in [`Airdrop::new`] and never recomputed.
#[derive(Debug, Clone)]
pub struct Airdrop {
    leaves: Vec<Leaf>,
    leaf_hashes: Vec<LeafHash>,
    root: Hash,
}

impl Airdrop {
    /// Expands, hashes and commits to an entitlement map of
    /// address string to balance hex string.
    pub fn new<I, K, V>(entitlements: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let leaves = expand_leaves(entitlements)?;
        let leaf_hashes: Vec<LeafHash> = leaves.iter().map(Leaf::hash).collect();
        let root = build_root(&leaf_hashes)?;
        debug!(leaves = leaves.len(), root = %hex_encode(root), "built airdrop commitment");
        Ok(Self {
            leaves,
            leaf_hashes,
            root,
        })
    }

    pub fn root(&self) -> Hash {
        self.root
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn leaf_hashes(&self) -> &[LeafHash] {
        &self.leaf_hashes
    }

    pub fn leaf(&self, index: usize) -> Result<&Leaf> {
        self.leaves.get(index).ok_or(AirdropError::IndexOutOfRange {
            index,
            len: self.leaves.len(),
        })
    }

    pub fn index_of(&self, address: &str) -> Result<usize> {
        index_of(&self.leaves, address)
    }

    pub fn proof(&self, index: usize) -> Result<Proof> {
        plain_proof(&self.leaf_hashes, index)
    }

    /// Splits the leaf hashes into chunks of `chunk_size`.
    pub fn chunk(&self, chunk_size: usize) -> Result<ChunkedTree> {
        build_chunked_root(&self.leaf_hashes, chunk_size)
    }

    /// Checks `proof` for the leaf at `index` against this airdrop's root.
    pub fn verify(&self, index: usize, proof: &[Hash]) -> bool {
        match self.leaf_hashes.get(index) {
            Some(leaf) => verify(index, leaf, proof, &self.root),
            None => false,
        }
    }
}
