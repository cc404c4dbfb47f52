//! Error types for airdrop commitments and proofs.
//!
//! Every fallible library operation returns an [`AirdropError`]. All of them
//! are synchronous and local; none is transient.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, AirdropError>;

/// Errors raised while encoding leaves, building trees or generating proofs.
#[derive(Debug, Error)]
pub enum AirdropError {
    /// The chunk size is not a power of two greater than one.
    #[error("chunk size must be a power of two greater than 1, got {0}")]
    InvalidChunkSize(usize),

    /// A balance does not fit in 256 bits.
    #[error("balance needs {bytes} bytes, at most 32 fit in a leaf")]
    EncodingOverflow {
        /// Significant big-endian bytes of the rejected value.
        bytes: usize,
    },

    /// The address is not part of the entitlement set.
    #[error("address not found: {0}")]
    AddressNotFound(String),

    /// A leaf index outside the tree.
    #[error("leaf index {index} is out of bounds for tree with {len} leaves")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of leaves in the tree.
        len: usize,
    },

    /// A root or proof was requested over zero leaves.
    #[error("merkle tree is empty")]
    EmptyTree,

    /// The address string is not 20 bytes of hex.
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress {
        /// Offending input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The balance string is not a hex quantity.
    #[error("invalid balance {input:?}: {reason}")]
    InvalidBalance {
        /// Offending input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A hash string is not 32 bytes of hex.
    #[error("invalid hash {input:?}: {reason}")]
    InvalidHash {
        /// Offending input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Two entitlement keys name the same address.
    #[error("duplicate address in entitlements: {0}")]
    DuplicateAddress(String),

    /// The supplied leaf group is not the chunk that holds the index.
    #[error("chunk {chunk} should hold {expected} leaves, got {got}")]
    ChunkLengthMismatch {
        /// Chunk number.
        chunk: usize,
        /// Leaves the commitment implies for this chunk.
        expected: usize,
        /// Leaves supplied.
        got: usize,
    },

    /// The supplied leaf group does not reduce to the committed chunk root.
    #[error("leaves of chunk {0} do not match the committed chunk root")]
    ChunkRootMismatch(usize),

    /// Root count disagrees with the leaf count and chunk size.
    #[error("commitment has {roots} chunk roots, {count} leaves in chunks of {chunk_size} need {expected}")]
    MalformedCommitment {
        /// Chunk roots present.
        roots: usize,
        /// Declared leaf count.
        count: usize,
        /// Declared chunk size.
        chunk_size: usize,
        /// Chunk roots implied by count and chunk size.
        expected: usize,
    },

    /// Reading or writing an artifact failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An artifact could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
