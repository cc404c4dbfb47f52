//! End-to-end checks over the public API: entitlements to leaves, full and
//! chunked commitments, proofs from each, and verification.

use std::collections::HashMap;

use airdrop_merkle::artifacts::ArtifactDir;
use airdrop_merkle::{
    build_chunked_root, build_root, chunked_proof, encode_leaf, get_leaves, hex_encode,
    keccak256_hash, parse_address, plain_proof, reduce_level, reduce_to_root, verify, Airdrop,
    AirdropError, ChunkedBuilder, LeafHash,
};
use sha3::{Digest, Keccak256};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// keccak256(0x00) .. keccak256(0x0f).
fn byte_leaves() -> Vec<LeafHash> {
    (0u8..16).map(|i| Keccak256::digest([i]).into()).collect()
}

/// A balance map with mixed-case keys in no particular order.
fn balances(n: usize) -> HashMap<String, String> {
    (0..n)
        .map(|i| {
            let mut address = [0u8; 20];
            address[0] = (i * 37 % 251) as u8;
            address[19] = i as u8;
            let key = if i % 2 == 0 {
                hex_encode(address).to_uppercase().replacen("0X", "0x", 1)
            } else {
                hex_encode(address)
            };
            (key, format!("0x{:x}", 1_000_000_000_000_000_000u128 * (i as u128 + 1)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn sixteen_byte_leaves_chunk_of_sixteen_is_full_root() {
    let leaves = byte_leaves();
    let tree = build_chunked_root(&leaves, 16).unwrap();
    assert_eq!(tree.root.roots.len(), 1);
    assert_eq!(tree.root.roots[0], build_root(&leaves).unwrap());
}

#[test]
fn sixteen_byte_leaves_chunk_of_two_is_first_level() {
    let leaves = byte_leaves();
    let tree = build_chunked_root(&leaves, 2).unwrap();
    let parents = reduce_level(&leaves);
    assert_eq!(tree.root.roots.len(), 8);
    for (i, root) in tree.root.roots.iter().enumerate() {
        assert_eq!(*root, parents[i]);
        assert_eq!(*root, keccak256_hash(leaves[2 * i], leaves[2 * i + 1]));
    }
}

#[test]
fn index_ten_proof_is_the_same_for_every_chunk_size() {
    let leaves = byte_leaves();
    let root = build_root(&leaves).unwrap();
    let plain = plain_proof(&leaves, 10).unwrap();
    assert_eq!(plain.len(), 4);

    let proofs: Vec<_> = [2usize, 4, 8, 16]
        .iter()
        .map(|&c| {
            let tree = build_chunked_root(&leaves, c).unwrap();
            chunked_proof(10, &tree.chunks[10 / c], &tree.root).unwrap()
        })
        .collect();

    for proof in &proofs {
        assert_eq!(*proof, plain);
        assert!(verify(10, &leaves[10], proof, &root));
    }
}

#[test]
fn chunking_never_changes_the_commitment() {
    let airdrop = Airdrop::new(&balances(45)).unwrap();
    for c in [2, 4, 8, 16, 32, 64] {
        let tree = airdrop.chunk(c).unwrap();
        assert_eq!(reduce_to_root(&tree.root.roots).unwrap(), airdrop.root());
    }
}

#[test]
fn invalid_chunk_sizes_are_rejected() {
    let leaves = byte_leaves();
    for c in [0, 1, 3, 5] {
        assert!(matches!(
            build_chunked_root(&leaves, c),
            Err(AirdropError::InvalidChunkSize(_))
        ));
        assert!(ChunkedBuilder::new(c).is_err());
    }
}

#[test]
fn leaves_are_independent_of_key_case_and_order() {
    let map = balances(20);
    let lowered: Vec<(String, String)> = map
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    assert_eq!(get_leaves(&map).unwrap(), get_leaves(lowered).unwrap());
}

#[test]
fn leaf_encoding_matches_packed_keccak() {
    let address = parse_address("0xC0FFEE254729296A45A3885639AC7E10F9D54979").unwrap();
    let balance = 0x3635c9adc5dea00000u128.to_be_bytes();
    let leaf = encode_leaf(7, &address, &balance).unwrap();

    let mut packed = [0u8; 84];
    packed[31] = 7;
    packed[32..52].copy_from_slice(&address);
    packed[84 - 16..].copy_from_slice(&balance);
    let expected: [u8; 32] = Keccak256::digest(packed).into();
    assert_eq!(leaf, expected);
}

#[test]
fn oversized_balance_is_rejected() {
    let mut input = balances(3);
    input.insert(
        "0x9999999999999999999999999999999999999999".to_string(),
        format!("0x1{}", "0".repeat(64)),
    );
    assert!(matches!(
        Airdrop::new(&input),
        Err(AirdropError::EncodingOverflow { .. })
    ));
}

#[test]
fn every_claim_verifies_and_tampering_fails() {
    let airdrop = Airdrop::new(&balances(13)).unwrap();
    let root = airdrop.root();
    for (index, leaf) in airdrop.leaf_hashes().iter().enumerate() {
        let proof = airdrop.proof(index).unwrap();
        assert!(verify(index, leaf, &proof, &root));

        let mut bad_leaf = *leaf;
        bad_leaf[0] ^= 1;
        assert!(!verify(index, &bad_leaf, &proof, &root));

        let mut bad_proof = proof.clone();
        bad_proof[0][31] ^= 1;
        assert!(!verify(index, leaf, &bad_proof, &root));

        let mut bad_root = root;
        bad_root[16] ^= 1;
        assert!(!verify(index, leaf, &proof, &bad_root));
    }
}

#[test]
fn unknown_address_is_reported() {
    let airdrop = Airdrop::new(&balances(5)).unwrap();
    assert!(matches!(
        airdrop.index_of("0x0000000000000000000000000000000000000001"),
        Err(AirdropError::AddressNotFound(_))
    ));
}

#[test]
fn persisted_chunks_regenerate_proofs() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactDir::create(dir.path()).unwrap();
    let airdrop = Airdrop::new(&balances(23)).unwrap();

    let mut builder = ChunkedBuilder::new(8).unwrap();
    artifacts.write_leaves(airdrop.leaves()).unwrap();
    for leaf in airdrop.leaf_hashes() {
        if let Some(chunk) = builder.push(*leaf).unwrap() {
            artifacts.write_chunk(chunk.index, &chunk.leaves).unwrap();
        }
    }
    let (commitment, last) = builder.finish().unwrap();
    let last = last.unwrap();
    artifacts.write_chunk(last.index, &last.leaves).unwrap();
    artifacts.write_root(&commitment).unwrap();

    let commitment = artifacts.read_root().unwrap();
    assert_eq!(commitment.root().unwrap(), airdrop.root());
    for record in artifacts.read_leaves().unwrap() {
        let chunk = artifacts.read_chunk(commitment.chunk_of(record.index).unwrap()).unwrap();
        let proof = chunked_proof(record.index, &chunk, &commitment).unwrap();
        assert_eq!(proof, airdrop.proof(record.index).unwrap());
        assert!(verify(record.index, &record.hash, &proof, &airdrop.root()));
    }
}
