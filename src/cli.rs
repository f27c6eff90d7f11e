use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// dcfc - Design Concept Format checker
#[derive(Parser, Debug)]
#[command(name = "dcfc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output diagnostics as NDJSON for CI
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a directory of DCF documents
    Validate {
        /// Directory containing the documents
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Override the default profile (lite, standard, strict)
        #[arg(short, long)]
        profile: Option<String>,
    },
}
