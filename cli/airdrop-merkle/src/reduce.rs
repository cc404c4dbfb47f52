//! Pairwise hash reduction.
//!
//! A level is reduced by hashing consecutive pairs `keccak256(left ‖ right)`.
//! An unpaired final node is hashed with itself.

use crate::common::{keccak256_hash, Hash};
use crate::error::{AirdropError, Result};

/// Reduces one level to its parent level of length `ceil(len / 2)`.
pub fn reduce_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|pair| {
            let left = pair[0];
            let right = if pair.len() == 2 { pair[1] } else { left };
            keccak256_hash(left, right)
        })
        .collect()
}

/// Applies [`reduce_level`] exactly `levels` times.
///
/// A lone node is self-paired while levels remain, the same way it would be
/// at the tail of a wider level.
pub fn reduce_by(level: &[Hash], levels: usize) -> Vec<Hash> {
    let mut current = level.to_vec();
    for _ in 0..levels {
        current = reduce_level(&current);
    }
    current
}

/// Reduces a level until a single node remains.
pub fn reduce_to_root(level: &[Hash]) -> Result<Hash> {
    let first = *level.first().ok_or(AirdropError::EmptyTree)?;
    if level.len() == 1 {
        return Ok(first);
    }
    let mut current = reduce_level(level);
    while current.len() > 1 {
        current = reduce_level(&current);
    }
    Ok(current[0])
}

/// Number of reductions from `len` nodes to one: `ceil(log2(len))`, 0 for `len <= 1`.
pub fn tree_depth(len: usize) -> usize {
    if len <= 1 {
        0
    } else {
        len.next_power_of_two().trailing_zeros() as usize
    }
}
