//! scrcheck command-line entry point

use clap::Parser;
use scrcheck_cli::commands::Commands;

#[derive(Debug, Parser)]
#[command(name = "scrcheck")]
#[command(version, about = "Editorial checks for scripture text with persistent annotations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
