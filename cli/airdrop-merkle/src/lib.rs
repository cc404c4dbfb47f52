//! Merkle commitments over airdrop entitlements.
//!
//! Entitlements (address, balance) are sorted, indexed and hashed into leaves;
//! the leaves are committed to by a Keccak-256 Merkle root, optionally stored
//! as power-of-two chunks. Proofs from the full tree and from a single chunk
//! are byte-identical and check against the same root.

#![forbid(unsafe_code)]

pub mod artifacts;
pub mod chunked;
pub mod common;
pub mod error;
pub mod leaf;
pub mod proof;
pub mod reduce;
pub mod tree;
pub mod verify;

pub use chunked::{build_chunked_root, Chunk, ChunkedBuilder, ChunkedRoot, ChunkedTree};
pub use common::{
    hex_encode, keccak256_hash, parse_address, parse_hash, write_file_atomic, Address, Hash,
};
pub use error::{AirdropError, Result};
pub use leaf::{
    encode_leaf, expand_leaves, get_leaves, index_of, Balance, Entitlement, Leaf, LeafHash,
};
pub use proof::{chunked_proof, plain_proof, Proof};
pub use reduce::{reduce_level, reduce_to_root};
pub use tree::{build_root, Airdrop};
pub use verify::verify;
