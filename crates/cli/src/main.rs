//! Librarian CLI — the main entry point.
//!
//! Commands:
//! - `process`  — Run a request against a document
//! - `answer`   — Answer a pending clarification and resume
//! - `continue` — Continue output the service's length ceiling cut off
//! - `chunk`    — Chunk a document and report the result
//! - `status`   — Show configuration and session status

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "librarian",
    about = "Librarian — document processing with a team of specialists",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a document with a free-text request
    Process {
        /// Path to a plain-text document
        file: PathBuf,

        /// What to do with the document
        #[arg(short, long)]
        request: String,

        /// Extra context passed to the specialists
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Answer a pending clarification and resume the session
    Answer {
        /// The answer to the specialist's question
        answer: String,
    },

    /// Continue output that was cut off by the service's length ceiling
    Continue,

    /// Chunk a document and report the chunks
    Chunk {
        /// Path to a plain-text document
        file: PathBuf,

        /// Override the maximum chunk size in characters
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Show configuration and session status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Process { file, request, context } => {
            commands::process::run(&file, &request, context).await?
        }
        Commands::Answer { answer } => commands::answer::run(&answer).await?,
        Commands::Continue => commands::continue_cmd::run().await?,
        Commands::Chunk { file, max_size } => commands::chunk::run(&file, max_size)?,
        Commands::Status => commands::status::run()?,
    }

    Ok(())
}
