//! CLI module for PMP Agentic RAG
//!
//! - `serve`: HTTP API exposing the three pipelines
//! - `query`, `classify`, `screen`: run one pipeline once and print the result as JSON

pub mod run;
pub mod serve;

use clap::{Parser, Subcommand};

pub use run::{DocumentArgs, QueryArgs};

/// PMP Agentic RAG - self-correcting retrieval pipelines
#[derive(Debug, Parser)]
#[command(name = "pmp-agentic-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer a question
    Query(QueryArgs),

    /// Classify a document into an administrative category
    Classify(DocumentArgs),

    /// Screen a document for personally identifiable information
    Screen(DocumentArgs),
}
