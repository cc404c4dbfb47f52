use crate::common::{keccak256_hash, Hash};
use crate::leaf::LeafHash;

/// Recomputes the root from a leaf, its index and a leaf-to-root proof.
///
/// Returns `true` only when the recomputed node equals `root`. This is the
/// computation an on-chain verifier performs.
pub fn verify(index: usize, leaf: &LeafHash, proof: &[Hash], root: &Hash) -> bool {
    let mut node = *leaf;
    let mut path = index;
    for sibling in proof {
        node = if path & 1 == 1 {
            keccak256_hash(*sibling, node)
        } else {
            keccak256_hash(node, *sibling)
        };
        path /= 2;
    }
    node == *root
}
