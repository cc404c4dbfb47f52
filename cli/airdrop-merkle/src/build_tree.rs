use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use airdrop_merkle::artifacts::{load_entitlements, ArtifactDir, DEFAULT_BALANCES_FILE};
use airdrop_merkle::{expand_leaves, hex_encode, Chunk, ChunkedBuilder};

#[derive(Parser, Debug)]
#[command(about = "Build the chunked Merkle commitment for a balance file", long_about = None)]
pub struct Cli {
    /// Balance file: JSON object of address to hex balance
    #[arg(short, long, env = "AIRDROP_BALANCES", default_value = DEFAULT_BALANCES_FILE)]
    balances: PathBuf,

    /// Leaves per chunk (power of two, at least 2)
    #[arg(short, long, env = "AIRDROP_CHUNK_SIZE")]
    chunk_size: usize,

    /// Directory for the root, chunk and leaf files
    #[arg(short, long, env = "AIRDROP_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,
}

fn write_chunk(out: &ArtifactDir, chunk: &Chunk, total: usize) -> Result<()> {
    let path = out.chunk_path(chunk.index);
    info!("Writing {} ({} of {})", path.display(), chunk.index + 1, total);
    out.write_chunk(chunk.index, &chunk.leaves)
        .with_context(|| format!("Failed to write chunk {}", chunk.index))?;
    debug!(chunk = chunk.index, root = %hex_encode(chunk.root), "chunk root");
    Ok(())
}

pub fn run(args: Cli) -> Result<()> {
    let mut builder = ChunkedBuilder::new(args.chunk_size).context("Invalid chunk size")?;

    info!("Reading balances from {:?}...", args.balances);
    let entitlements =
        load_entitlements(&args.balances).context("Failed to load balance file")?;
    let leaves = expand_leaves(&entitlements).context("Invalid entitlement data")?;
    if leaves.is_empty() {
        anyhow::bail!("Balance file {:?} has no entries", args.balances);
    }
    info!("Total entitlements: {}", leaves.len());

    let out = ArtifactDir::create(&args.out_dir).context("Failed to create output directory")?;
    info!("Writing {}", out.leaves_path().display());
    out.write_leaves(&leaves)
        .context("Failed to write leaves file")?;

    let total = leaves.len().div_ceil(args.chunk_size);
    for leaf in &leaves {
        if let Some(chunk) = builder.push(leaf.hash())? {
            write_chunk(&out, &chunk, total)?;
        }
    }
    let (commitment, last) = builder.finish()?;
    if let Some(chunk) = last {
        write_chunk(&out, &chunk, total)?;
    }

    info!("Writing {}", out.root_path().display());
    out.write_root(&commitment)
        .context("Failed to write root file")?;

    let root = commitment.root()?;
    info!("Merkle root: {}", hex_encode(root));
    println!("{}", hex_encode(root));
    Ok(())
}
