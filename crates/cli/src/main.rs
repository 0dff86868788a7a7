//! GreenBasket CLI - Catalog inspection and API checks.
//!
//! # Usage
//!
//! ```bash
//! # List the first page of products
//! gb-cli catalog products
//!
//! # List categories or brands
//! gb-cli catalog categories
//! gb-cli catalog brands --page 2
//!
//! # Verify the remote commerce API answers
//! gb-cli check
//! ```
//!
//! # Commands
//!
//! - `catalog` - List products, categories, or brands from the remote API
//! - `check` - Verify the remote commerce API is reachable

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gb-cli")]
#[command(author, version, about = "GreenBasket CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the remote catalog
    Catalog {
        #[command(subcommand)]
        target: CatalogTarget,
    },
    /// Verify the remote commerce API is reachable
    Check,
}

#[derive(Subcommand)]
enum CatalogTarget {
    /// List products
    Products {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Keyword filter
        #[arg(short, long)]
        keyword: Option<String>,
    },
    /// List categories
    Categories,
    /// List brands
    Brands {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
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
        Commands::Catalog { target } => match target {
            CatalogTarget::Products { page, keyword } => {
                commands::catalog::products(page, keyword).await?;
            }
            CatalogTarget::Categories => commands::catalog::categories().await?,
            CatalogTarget::Brands { page } => commands::catalog::brands(page).await?,
        },
        Commands::Check => commands::check::run().await?,
    }
    Ok(())
}
