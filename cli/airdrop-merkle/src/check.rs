use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use airdrop_merkle::artifacts::read_json;
use airdrop_merkle::{encode_leaf, hex_encode, parse_address, parse_hash, verify, Balance, Hash};

use crate::claim::Claim;

#[derive(Parser, Debug)]
#[command(about = "Check a claim payload against a Merkle root", long_about = None)]
pub struct Cli {
    /// Claim JSON produced by `claim`
    #[arg(short, long)]
    claim: PathBuf,

    /// Merkle root to check against (defaults to the root in the claim)
    #[arg(short, long)]
    root: Option<String>,
}

/// Recomputes the leaf from the claimed entitlement and checks its proof.
fn check_claim(claim: &Claim, root: &Hash) -> Result<bool> {
    let address = parse_address(&claim.address).context("Invalid claim address")?;
    let amount = Balance::from_hex(&claim.amount).context("Invalid claim amount")?;
    let leaf = encode_leaf(claim.index, &address, amount.as_bytes())?;

    let claimed_leaf = parse_hash(&claim.leaf).context("Invalid leaf hash")?;
    if claimed_leaf != leaf {
        anyhow::bail!(
            "Leaf hash {} does not encode index {}, address {}, amount {}",
            claim.leaf,
            claim.index,
            claim.address,
            claim.amount
        );
    }

    let proof = claim
        .merkle_proof
        .iter()
        .map(|node| parse_hash(node))
        .collect::<airdrop_merkle::Result<Vec<Hash>>>()
        .context("Invalid Merkle proof")?;

    Ok(verify(claim.index, &leaf, &proof, root))
}

pub fn run(args: Cli) -> Result<()> {
    info!("Reading claim from {:?}...", args.claim);
    let claim: Claim = read_json(&args.claim).context("Failed to read claim file")?;

    let root_str = args.root.as_deref().unwrap_or(&claim.merkle_root);
    let root = parse_hash(root_str).context("Invalid Merkle root")?;

    if !check_claim(&claim, &root)? {
        anyhow::bail!(
            "Claim for leaf {} does not verify against root {}",
            claim.index,
            hex_encode(root)
        );
    }

    info!("Claim for {} verifies against {}", claim.address, hex_encode(root));
    println!("valid");
    Ok(())
}
