use clap::Parser;
use pmp_agentic_rag::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Query(args) => cli::run::query(args).await,
        Command::Classify(args) => cli::run::classify(args).await,
        Command::Screen(args) => cli::run::screen(args).await,
    }
}
