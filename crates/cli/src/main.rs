//! Shopdesk CLI - Database migrations and sample data.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! shopdesk-cli migrate
//!
//! # Insert sample products (skips slugs that already exist)
//! shopdesk-cli seed
//!
//! # Replace every product with the samples
//! shopdesk-cli seed --clear
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopdesk-cli")]
#[command(author, version, about = "Shopdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Insert sample products
    Seed {
        /// Delete all existing products first
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::admin().await?,
        Commands::Seed { clear } => {
            let inserted = commands::seed::products(clear).await?;
            tracing::info!("Seeded {inserted} product(s)");
        }
    }
    Ok(())
}
