//! Laar Relay CLI - operator tools for the webhook relay.
//!
//! # Usage
//!
//! ```bash
//! # List the courier city catalog, or look up one city
//! laar-cli cities
//! laar-cli cities --search Guayaquil
//!
//! # Check courier credentials
//! laar-cli auth-check
//!
//! # Dry-run an order through transform + validate (nothing is submitted)
//! laar-cli preview --file order.json
//!
//! # Sign a webhook body for manual testing
//! laar-cli sign --file order.json
//! ```
//!
//! Reads the same environment variables as the relay server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "laar-cli")]
#[command(author, version, about = "Laar Relay operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the courier city catalog
    Cities {
        /// Resolve a single city name instead of listing all
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Authenticate against the courier and show the account
    AuthCheck,
    /// Build and validate the shipment for an order without submitting it
    Preview {
        /// Path to a Shopify order JSON file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Compute the `x-shopify-hmac-sha256` header for a body
    Sign {
        /// Path to the raw webhook body
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Cities { search } => commands::cities::run(search.as_deref()).await?,
        Commands::AuthCheck => commands::auth::check().await?,
        Commands::Preview { file } => commands::preview::run(&file).await?,
        Commands::Sign { file } => commands::sign::run(&file)?,
    }
    Ok(())
}
