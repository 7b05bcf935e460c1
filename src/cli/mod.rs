//! CLI interface for zkss.
//!
//! Provides command-line argument parsing using clap.

use clap::{Parser, Subcommand};

/// Command-line interface for zkss.
#[derive(Parser)]
#[command(name = "zkss")]
#[command(author, version, about = "Zettelkasten keyword and semantic search", long_about = None)]
pub struct Cli {
    /// Log progress at info level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search notes by filename and content, most exact matches first.
    Search {
        /// Search words; joined with single spaces into the query phrase.
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,

        /// Rank notes by embedding similarity instead of keyword tiers.
        #[arg(short, long)]
        semantic: bool,

        /// Maximum number of semantic results (default from config).
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Bring the semantic index up to date with the notes directory.
    Index {
        /// Re-embed every note, even unchanged ones.
        #[arg(short, long)]
        force: bool,
    },

    /// Print the full contents of a note.
    Read {
        /// Note filename, including extension (e.g., "20231027 Test Note.md").
        filename: String,
    },

    /// Start the MCP server for AI editor integration.
    #[cfg(feature = "mcp")]
    Serve,
}
