//! Conker CLI - Drive the storefront cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Add a product (checked against the catalog first)
//! conker cart add 3
//!
//! # Show the cart, or render the checkout fragment
//! conker cart show
//! conker cart show --html
//!
//! # Adjust quantities
//! conker cart inc 3
//! conker cart dec 3
//! conker cart change 3 -2
//! conker cart remove "Old Item" --by-name
//!
//! # Look up a product
//! conker product 3
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and modify the persisted cart
//! - `product` - Look up a product in the catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use conker_storefront::config::{LogFormat, StorefrontConfig};
use conker_storefront::error::AppError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "conker")]
#[command(author, version, about = "Conker storefront cart tools")]
struct Cli {
    /// Directory holding the persisted cart (overrides `CONKER_CART_DIR`)
    #[arg(long, global = true)]
    cart_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and modify the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Look up a product in the catalog
    Product {
        /// Product id
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart contents and total
    Show {
        /// Render the checkout HTML fragment instead of text
        #[arg(long)]
        html: bool,
    },
    /// Add one unit of a product after checking stock
    Add {
        /// Product id
        id: String,
    },
    /// Add one more unit of a line
    Inc {
        /// Product id, or name with `--by-name`
        key: String,
        #[arg(long)]
        by_name: bool,
    },
    /// Remove one unit of a line
    Dec {
        /// Product id, or name with `--by-name`
        key: String,
        #[arg(long)]
        by_name: bool,
    },
    /// Change a line's quantity by a signed amount (stock-checked when it grows)
    Change {
        /// Product id, or name with `--by-name`
        key: String,
        /// Amount to add; negative values remove units
        #[arg(allow_negative_numbers = true)]
        delta: i64,
        #[arg(long)]
        by_name: bool,
    },
    /// Remove a line entirely
    Remove {
        /// Product id, or name with `--by-name`
        key: String,
        #[arg(long)]
        by_name: bool,
    },
    /// Empty the cart
    Clear,
    /// Print the cart total
    Total,
}

/// Initialize tracing with `EnvFilter`, writing to stderr so stdout stays clean.
fn init_tracing(format: LogFormat) {
    // Defaults to warn level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "conker=warn,conker_storefront=warn".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Print a message for the user on stderr.
#[allow(clippy::print_stderr)]
fn report(message: &str) {
    eprintln!("{message}");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report(&format!("Invalid configuration: {e}"));
            std::process::exit(2);
        }
    };
    if let Some(dir) = cli.cart_dir.clone() {
        config.cart_dir = dir;
    }

    init_tracing(config.log_format);

    if let Err(e) = run(cli, &config).await {
        if !e.is_user_error() {
            tracing::error!("Command failed: {e}");
        }
        report(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), AppError> {
    match cli.command {
        Commands::Cart { action } => {
            let ctx = commands::Context::open(config)?;
            match action {
                CartAction::Show { html } => commands::cart::show(&ctx, html)?,
                CartAction::Add { id } => commands::cart::add(&ctx, &id).await?,
                CartAction::Inc { key, by_name } => {
                    commands::cart::increment(&ctx, &key, by_name).await?;
                }
                CartAction::Dec { key, by_name } => commands::cart::decrement(&ctx, &key, by_name)?,
                CartAction::Change {
                    key,
                    delta,
                    by_name,
                } => commands::cart::change(&ctx, &key, delta, by_name).await?,
                CartAction::Remove { key, by_name } => {
                    commands::cart::remove(&ctx, &key, by_name)?;
                }
                CartAction::Clear => commands::cart::clear(&ctx)?,
                CartAction::Total => commands::cart::total(&ctx),
            }
        }
        Commands::Product { id } => commands::product::show(config, &id).await?,
    }
    Ok(())
}
