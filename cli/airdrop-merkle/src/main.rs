#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use clap::{Parser, Subcommand};

mod build_tree;
mod check;
mod claim;
mod logging;

use logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "airdrop")]
#[command(about = "Airdrop Merkle commitment and claim tools", long_about = None)]
#[command(version, propagate_version = true)]
struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, env = "AIRDROP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "AIRDROP_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    BuildTree(build_tree::Cli),
    Claim(claim::Cli),
    Verify(check::Cli),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::BuildTree(args) => build_tree::run(args)?,
        Commands::Claim(args) => claim::run(args)?,
        Commands::Verify(args) => check::run(args)?,
    }

    Ok(())
}
