//! Chunked Merkle trees.
//!
//! Leaves are split into consecutive groups of a power-of-two `chunk_size`.
//! Each group is reduced to a chunk root, and the chunk roots are the level
//! `log2(chunk_size)` of the full tree. Reducing them with the same pairwise
//! rule gives the unchunked root, so the chunk size changes how the
//! commitment is stored and never its value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{hex_hashes, Hash};
use crate::error::{AirdropError, Result};
use crate::leaf::LeafHash;
use crate::reduce::{reduce_by, reduce_to_root, tree_depth};

/// The persisted commitment: chunk roots plus the shape needed to rebuild
/// proofs from individual chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkedRoot {
    #[serde(with = "hex_hashes")]
    pub roots: Vec<Hash>,
    pub count: usize,
    #[serde(rename = "chunkSize", alias = "C")]
    pub chunk_size: usize,
}

/// Chunk roots together with the leaf groups they were built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedTree {
    pub root: ChunkedRoot,
    pub chunks: Vec<Vec<LeafHash>>,
}

/// A completed leaf group emitted by [`ChunkedBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub leaves: Vec<LeafHash>,
    pub root: Hash,
}

/// Checks that `chunk_size` is a power of two greater than one and returns
/// its base-2 logarithm.
pub fn validate_chunk_size(chunk_size: usize) -> Result<usize> {
    if chunk_size <= 1 || !chunk_size.is_power_of_two() {
        return Err(AirdropError::InvalidChunkSize(chunk_size));
    }
    Ok(chunk_size.trailing_zeros() as usize)
}

/// Levels reduced inside every chunk of a tree with `count` leaves.
///
/// A tree that fits in one chunk is only as deep as its leaves require;
/// otherwise every chunk, including a short final one, is reduced the full
/// `log2(chunk_size)` levels.
pub fn chunk_depth(count: usize, chunk_size: usize) -> usize {
    let full = chunk_size.trailing_zeros() as usize;
    full.min(tree_depth(count))
}

impl ChunkedRoot {
    /// Reduces the chunk roots to the single committed root.
    pub fn root(&self) -> Result<Hash> {
        reduce_to_root(&self.roots)
    }

    pub fn chunk_count(&self) -> usize {
        self.count.div_ceil(self.chunk_size)
    }

    pub fn chunk_depth(&self) -> usize {
        chunk_depth(self.count, self.chunk_size)
    }

    /// Chunk holding the leaf at `index`.
    pub fn chunk_of(&self, index: usize) -> Result<usize> {
        if index >= self.count {
            return Err(AirdropError::IndexOutOfRange {
                index,
                len: self.count,
            });
        }
        Ok(index / self.chunk_size)
    }

    /// Number of leaves in chunk `chunk`; only the last one may be short.
    pub fn chunk_len(&self, chunk: usize) -> usize {
        let start = chunk * self.chunk_size;
        self.count.saturating_sub(start).min(self.chunk_size)
    }

    /// Rejects commitments whose shape is internally inconsistent.
    pub fn validate(&self) -> Result<()> {
        validate_chunk_size(self.chunk_size)?;
        if self.count == 0 {
            return Err(AirdropError::EmptyTree);
        }
        let expected = self.chunk_count();
        if self.roots.len() != expected {
            return Err(AirdropError::MalformedCommitment {
                roots: self.roots.len(),
                count: self.count,
                chunk_size: self.chunk_size,
                expected,
            });
        }
        Ok(())
    }
}

/// Incremental chunk builder.
///
/// Leaves are pushed one at a time; each full chunk is reduced and handed
/// back immediately so the caller can persist it and drop the leaves.
#[derive(Debug)]
pub struct ChunkedBuilder {
    chunk_size: usize,
    depth: usize,
    pending: Vec<LeafHash>,
    roots: Vec<Hash>,
    count: usize,
}

impl ChunkedBuilder {
    pub fn new(chunk_size: usize) -> Result<Self> {
        let depth = validate_chunk_size(chunk_size)?;
        Ok(Self {
            chunk_size,
            depth,
            pending: Vec::with_capacity(chunk_size),
            roots: Vec::new(),
            count: 0,
        })
    }

    /// Adds the next leaf, returning the chunk it completes, if any.
    pub fn push(&mut self, leaf: LeafHash) -> Result<Option<Chunk>> {
        self.pending.push(leaf);
        self.count += 1;
        if self.pending.len() < self.chunk_size {
            return Ok(None);
        }
        let leaves = std::mem::replace(&mut self.pending, Vec::with_capacity(self.chunk_size));
        let root = reduce_to_root(&leaves)?;
        Ok(Some(self.seal(leaves, root)))
    }

    /// Leaves pushed so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Closes the final, possibly short, chunk and returns the commitment.
    pub fn finish(mut self) -> Result<(ChunkedRoot, Option<Chunk>)> {
        if self.count == 0 {
            return Err(AirdropError::EmptyTree);
        }
        let last = if self.pending.is_empty() {
            None
        } else {
            let leaves = std::mem::take(&mut self.pending);
            let root = if self.roots.is_empty() {
                reduce_to_root(&leaves)?
            } else {
                reduce_by(&leaves, self.depth)[0]
            };
            Some(self.seal(leaves, root))
        };
        let root = ChunkedRoot {
            roots: self.roots,
            count: self.count,
            chunk_size: self.chunk_size,
        };
        debug!(
            count = root.count,
            chunk_size = root.chunk_size,
            chunks = root.roots.len(),
            "chunked tree complete"
        );
        Ok((root, last))
    }

    fn seal(&mut self, leaves: Vec<LeafHash>, root: Hash) -> Chunk {
        let index = self.roots.len();
        self.roots.push(root);
        Chunk {
            index,
            leaves,
            root,
        }
    }
}

/// Splits `leaves` into chunks of `chunk_size` and computes every chunk root.
///
/// # Errors
/// [`AirdropError::InvalidChunkSize`] before any hashing, then
/// [`AirdropError::EmptyTree`] for an empty leaf sequence.
pub fn build_chunked_root(leaves: &[LeafHash], chunk_size: usize) -> Result<ChunkedTree> {
    let mut builder = ChunkedBuilder::new(chunk_size)?;
    if leaves.is_empty() {
        return Err(AirdropError::EmptyTree);
    }
    let mut chunks = Vec::with_capacity(leaves.len().div_ceil(chunk_size));
    for &leaf in leaves {
        if let Some(chunk) = builder.push(leaf)? {
            chunks.push(chunk.leaves);
        }
    }
    let (root, last) = builder.finish()?;
    chunks.extend(last.map(|chunk| chunk.leaves));
    Ok(ChunkedTree { root, chunks })
}
