//! Merkle proof generation for full and chunked trees.
//!
//! Both proofs are produced by the same climb over successive levels. At a
//! position `path` the sibling is `path + 1` for even paths (the node itself
//! past the end of the level) and `path - 1` for odd paths.

use crate::chunked::ChunkedRoot;
use crate::common::Hash;
use crate::error::{AirdropError, Result};
use crate::leaf::LeafHash;
use crate::reduce::{reduce_level, tree_depth};

/// Sibling hashes ordered from leaf to root.
pub type Proof = Vec<Hash>;

fn sibling(level: &[Hash], path: usize) -> Hash {
    if path % 2 == 1 {
        level[path - 1]
    } else {
        level.get(path + 1).copied().unwrap_or(level[path])
    }
}

/// Climbs `levels` levels from `path`, appending one sibling per level, and
/// returns the node reached.
fn climb(mut level: Vec<Hash>, mut path: usize, levels: usize, proof: &mut Proof) -> Hash {
    for _ in 0..levels {
        proof.push(sibling(&level, path));
        level = reduce_level(&level);
        path /= 2;
    }
    level[path]
}

/// Generates the proof for the leaf at `index` over the full leaf sequence.
///
/// # Errors
/// [`AirdropError::EmptyTree`] for no leaves and
/// [`AirdropError::IndexOutOfRange`] for an index past the last leaf.
pub fn plain_proof(leaves: &[LeafHash], index: usize) -> Result<Proof> {
    if leaves.is_empty() {
        return Err(AirdropError::EmptyTree);
    }
    if index >= leaves.len() {
        return Err(AirdropError::IndexOutOfRange {
            index,
            len: leaves.len(),
        });
    }
    let depth = tree_depth(leaves.len());
    let mut proof = Vec::with_capacity(depth);
    climb(leaves.to_vec(), index, depth, &mut proof);
    Ok(proof)
}

/// Generates the proof for the leaf at `global_index` from the one leaf group
/// that contains it and the committed chunk roots.
///
/// The first phase climbs inside the chunk from `global_index mod chunk_size`;
/// for a power-of-two chunk size the parity of every in-chunk level matches
/// the parity of `global_index` itself. The second phase climbs the chunk
/// roots from `global_index div chunk_size`. The result is identical to
/// [`plain_proof`] over the full leaf sequence for every valid chunk size.
pub fn chunked_proof(
    global_index: usize,
    chunk_leaves: &[LeafHash],
    commitment: &ChunkedRoot,
) -> Result<Proof> {
    commitment.validate()?;
    let chunk = commitment.chunk_of(global_index)?;
    let expected = commitment.chunk_len(chunk);
    if chunk_leaves.len() != expected {
        return Err(AirdropError::ChunkLengthMismatch {
            chunk,
            expected,
            got: chunk_leaves.len(),
        });
    }

    let inner = commitment.chunk_depth();
    let outer = tree_depth(commitment.roots.len());
    let mut proof = Vec::with_capacity(inner + outer);

    let local_root = climb(
        chunk_leaves.to_vec(),
        global_index % commitment.chunk_size,
        inner,
        &mut proof,
    );
    if local_root != commitment.roots[chunk] {
        return Err(AirdropError::ChunkRootMismatch(chunk));
    }

    climb(commitment.roots.clone(), chunk, outer, &mut proof);
    Ok(proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunked::build_chunked_root;
    use crate::common::{keccak256, keccak256_hash};
    use crate::verify::verify;

    fn leaves(n: usize) -> Vec<LeafHash> {
        (0..n).map(|i| keccak256(&[i as u8])).collect()
    }

    fn chunked_for(leaves: &[LeafHash], index: usize, chunk_size: usize) -> Result<Proof> {
        let tree = build_chunked_root(leaves, chunk_size)?;
        let chunk = &tree.chunks[index / chunk_size];
        chunked_proof(index, chunk, &tree.root)
    }

    #[test]
    fn test_plain_proof_four_leaves() {
        let leaves = leaves(4);
        let proof = plain_proof(&leaves, 0).unwrap();
        assert_eq!(
            proof,
            vec![leaves[1], keccak256_hash(leaves[2], leaves[3])]
        );
    }

    #[test]
    fn test_plain_proof_self_pairs_last_leaf() {
        let leaves = leaves(3);
        let proof = plain_proof(&leaves, 2).unwrap();
        assert_eq!(proof[0], leaves[2]);
        assert_eq!(proof[1], keccak256_hash(leaves[0], leaves[1]));
    }

    #[test]
    fn test_plain_proof_single_leaf_is_empty() {
        assert!(plain_proof(&leaves(1), 0).unwrap().is_empty());
    }

    #[test]
    fn test_plain_proof_errors() {
        assert!(matches!(plain_proof(&[], 0), Err(AirdropError::EmptyTree)));
        assert!(matches!(
            plain_proof(&leaves(4), 4),
            Err(AirdropError::IndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_chunked_proof_identical_for_all_chunk_sizes() {
        let leaves = leaves(16);
        let plain = plain_proof(&leaves, 10).unwrap();
        for c in [2, 4, 8, 16] {
            assert_eq!(chunked_for(&leaves, 10, c).unwrap(), plain, "c={c}");
        }
    }

    #[test]
    fn test_chunked_proof_matches_plain_for_uneven_trees() {
        for n in 1..=37 {
            let leaves = leaves(n);
            let root = crate::tree::build_root(&leaves).unwrap();
            for index in 0..n {
                let plain = plain_proof(&leaves, index).unwrap();
                assert_eq!(plain.len(), tree_depth(n));
                assert!(verify(index, &leaves[index], &plain, &root));
                for c in [2, 4, 8, 64] {
                    let chunked = chunked_for(&leaves, index, c).unwrap();
                    assert_eq!(chunked, plain, "n={n} index={index} c={c}");
                }
            }
        }
    }

    #[test]
    fn test_chunked_proof_out_of_range() {
        let leaves = leaves(9);
        let tree = build_chunked_root(&leaves, 4).unwrap();
        assert!(matches!(
            chunked_proof(9, &tree.chunks[2], &tree.root),
            Err(AirdropError::IndexOutOfRange { index: 9, len: 9 })
        ));
    }

    #[test]
    fn test_chunked_proof_wrong_chunk() {
        let leaves = leaves(9);
        let tree = build_chunked_root(&leaves, 4).unwrap();
        assert!(matches!(
            chunked_proof(8, &tree.chunks[0], &tree.root),
            Err(AirdropError::ChunkLengthMismatch {
                chunk: 2,
                expected: 1,
                got: 4
            })
        ));
        assert!(matches!(
            chunked_proof(5, &tree.chunks[0], &tree.root),
            Err(AirdropError::ChunkRootMismatch(1))
        ));
    }

    #[test]
    fn test_chunked_proof_rejects_bad_commitment() {
        let leaves = leaves(8);
        let mut tree = build_chunked_root(&leaves, 4).unwrap();
        tree.root.chunk_size = 3;
        assert!(matches!(
            chunked_proof(0, &tree.chunks[0], &tree.root),
            Err(AirdropError::InvalidChunkSize(3))
        ));
    }
}
