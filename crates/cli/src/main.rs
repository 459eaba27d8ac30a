//! Go Marketplace CLI - Inspect and edit the local cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cli show
//!
//! # Add a product
//! gm-cli add --id sku-1 --title "Running Shoe" --price 59.90
//!
//! # Change quantities
//! gm-cli increment sku-1
//! gm-cli decrement sku-1
//!
//! # Drop a line, or everything
//! gm-cli remove sku-1
//! gm-cli clear
//! ```
//!
//! # Commands
//!
//! - `show` - Print cart lines, item count and subtotal
//! - `add` - Add one unit of a product
//! - `increment` / `decrement` - Step a line's quantity
//! - `remove` / `clear` - Drop lines

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Go Marketplace cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(short, long)]
        id: String,

        /// Display title
        #[arg(short, long)]
        title: String,

        /// Image URL
        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(short, long)]
        price: String,
    },
    /// Add one unit to a product already in the cart
    Increment {
        /// Product ID
        id: String,
    },
    /// Remove one unit; the line is dropped at zero
    Decrement {
        /// Product ID
        id: String,
    },
    /// Drop a product from the cart
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for the cart crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gm_cli=info,go_marketplace_cart=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show => commands::cart::show().await?,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(&id, &title, &image_url, &price).await?,
        Commands::Increment { id } => commands::cart::increment(&id).await?,
        Commands::Decrement { id } => commands::cart::decrement(&id).await?,
        Commands::Remove { id } => commands::cart::remove(&id).await?,
        Commands::Clear => commands::cart::clear().await?,
    }
    Ok(())
}
