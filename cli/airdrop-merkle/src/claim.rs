use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use airdrop_merkle::artifacts::{load_entitlements, ArtifactDir, DEFAULT_BALANCES_FILE};
use airdrop_merkle::{
    chunked_proof, hex_encode, index_of, verify, write_file_atomic, Airdrop, Hash, Leaf, Proof,
};

#[derive(Parser, Debug)]
#[command(about = "Generate the redemption payload for one entitlement", long_about = None)]
pub struct Cli {
    /// Leaf index or address to claim
    target: String,

    /// Balance file used to rebuild the full tree
    #[arg(short, long, env = "AIRDROP_BALANCES", default_value = DEFAULT_BALANCES_FILE)]
    balances: PathBuf,

    /// Build the proof from the chunk artifacts in this directory instead
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Arguments a redemption contract needs, plus the root they check against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub merkle_root: String,
    pub index: usize,
    pub address: String,
    pub amount: String,
    pub leaf: String,
    pub merkle_proof: Vec<String>,
}

impl Claim {
    fn new(root: Hash, leaf: &Leaf, proof: &[Hash]) -> Self {
        Self {
            merkle_root: hex_encode(root),
            index: leaf.index,
            address: hex_encode(leaf.address),
            amount: leaf.balance.to_string(),
            leaf: hex_encode(leaf.hash()),
            merkle_proof: proof.iter().map(hex_encode).collect(),
        }
    }
}

enum Target<'a> {
    Index(usize),
    Address(&'a str),
}

impl<'a> Target<'a> {
    fn parse(s: &'a str) -> Result<Self> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Target::Index(s.parse().context("Invalid leaf index")?))
        } else {
            Ok(Target::Address(s))
        }
    }

    fn resolve(&self, leaves: &[Leaf]) -> Result<usize> {
        match self {
            Target::Index(index) => Ok(*index),
            Target::Address(address) => {
                index_of(leaves, address).context("Address not found in entitlements")
            }
        }
    }
}

fn claim_from_balances(target: &Target<'_>, balances: &Path) -> Result<(Hash, Leaf, Proof)> {
    info!("Loading balances from {:?}...", balances);
    let entitlements = load_entitlements(balances).context("Failed to load balance file")?;
    let airdrop = Airdrop::new(&entitlements).context("Failed to build Merkle tree")?;

    let index = target.resolve(airdrop.leaves())?;
    let leaf = *airdrop.leaf(index)?;
    info!("Generating Merkle proof for leaf {}...", index);
    let proof = airdrop.proof(index)?;
    Ok((airdrop.root(), leaf, proof))
}

fn claim_from_artifacts(target: &Target<'_>, dir: &Path) -> Result<(Hash, Leaf, Proof)> {
    let artifacts = ArtifactDir::new(dir);
    info!("Loading commitment from {:?}...", artifacts.root_path());
    let commitment = artifacts.read_root().context("Failed to load root file")?;
    let leaves: Vec<Leaf> = artifacts
        .read_leaves()
        .context("Failed to load leaves file")?
        .iter()
        .map(|record| record.leaf())
        .collect();
    if leaves.len() != commitment.count {
        anyhow::bail!(
            "Leaves file has {} entries but the commitment covers {}",
            leaves.len(),
            commitment.count
        );
    }

    let index = target.resolve(&leaves)?;
    let chunk = commitment.chunk_of(index)?;
    let chunk_leaves = artifacts
        .read_chunk(chunk)
        .with_context(|| format!("Failed to load chunk {chunk}"))?;
    info!("Generating Merkle proof for leaf {} from chunk {}...", index, chunk);
    let proof = chunked_proof(index, &chunk_leaves, &commitment)?;
    Ok((commitment.root()?, leaves[index], proof))
}

pub fn run(args: Cli) -> Result<()> {
    let target = Target::parse(&args.target)?;
    let (root, leaf, proof) = match &args.artifacts {
        Some(dir) => claim_from_artifacts(&target, dir)?,
        None => claim_from_balances(&target, &args.balances)?,
    };

    if !verify(leaf.index, &leaf.hash(), &proof, &root) {
        anyhow::bail!("Generated proof for leaf {} does not verify", leaf.index);
    }
    if leaf.balance.is_zero() {
        warn!("Entitlement {} has a zero balance", hex_encode(leaf.address));
    }

    let claim = Claim::new(root, &leaf, &proof);
    let json_output = serde_json::to_string_pretty(&claim).context("Failed to serialize JSON")?;
    match &args.output {
        Some(path) => {
            info!("Writing claim JSON to {:?}...", path);
            write_file_atomic(path, &json_output).context("Failed to write claim file")?;
        }
        None => println!("{json_output}"),
    }

    info!("Claimer address: {}", claim.address);
    info!("Amount: {}", claim.amount);
    info!("Proof length: {} nodes", claim.merkle_proof.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_merkle::expand_leaves;

    #[test]
    fn test_target_parse() {
        assert!(matches!(Target::parse("42").unwrap(), Target::Index(42)));
        assert!(matches!(
            Target::parse("0x1111111111111111111111111111111111111111").unwrap(),
            Target::Address(_)
        ));
    }

    #[test]
    fn test_claim_fields() {
        let leaves = expand_leaves(vec![
            ("0x1111111111111111111111111111111111111111", "0x64"),
            ("0x2222222222222222222222222222222222222222", "0xc8"),
        ])
        .unwrap();
        let proof = vec![leaves[0].hash()];
        let claim = Claim::new([9u8; 32], &leaves[1], &proof);
        assert_eq!(claim.index, 1);
        assert_eq!(claim.address, "0x2222222222222222222222222222222222222222");
        assert_eq!(claim.amount, "0xc8");
        assert_eq!(claim.leaf, hex_encode(leaves[1].hash()));
        assert_eq!(claim.merkle_proof, vec![hex_encode(leaves[0].hash())]);
    }

    #[test]
    fn test_target_resolve_address() {
        let leaves = expand_leaves(vec![
            ("0x2222222222222222222222222222222222222222", "0x1"),
            ("0x1111111111111111111111111111111111111111", "0x1"),
        ])
        .unwrap();
        let target = Target::parse("0x2222222222222222222222222222222222222222").unwrap();
        assert_eq!(target.resolve(&leaves).unwrap(), 1);
        let missing = Target::parse("0x3333333333333333333333333333333333333333").unwrap();
        assert!(missing.resolve(&leaves).is_err());
    }
}
