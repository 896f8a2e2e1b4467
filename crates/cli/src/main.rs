//! Threadline CLI - Catalog database tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! threadline-cli migrate
//!
//! # Load products from a JSON array into the catalog
//! threadline-cli seed --file data/products.json
//!
//! # Check a product file without touching the database
//! threadline-cli seed --file data/products.json --dry-run
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run catalog migrations
//! - `seed` - Upsert catalog products from a JSON file

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "threadline-cli")]
#[command(author, version, about = "Threadline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Upsert catalog products from a JSON file
    Seed {
        /// JSON array of product documents, each with an `id`
        #[arg(short, long)]
        file: PathBuf,

        /// Validate the file and report what would be written
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file, dry_run } => commands::seed::products(&file, dry_run).await?,
    }
    Ok(())
}
