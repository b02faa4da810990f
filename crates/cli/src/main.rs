//! Woo Storefront CLI - browse a WooCommerce store from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Save credentials to woo-settings.json
//! woo setup -d shop.example.com -k ck_... -s cs_...
//!
//! # Shop grid, page 2
//! woo products --page 2
//!
//! # Product page with variations and reviews
//! woo product 22
//!
//! # Latest reviews with the reviewed products
//! woo reviews
//!
//! # Top clients and the customer list
//! woo customers
//!
//! # Checkout totals with a coupon
//! woo checkout --subtotal 100 --coupon SAVE10
//! ```
//!
//! # Commands
//!
//! - `setup` - Persist store credentials
//! - `products` / `featured` / `categories` / `product` - Catalog
//! - `orders` / `customers` - Order history and customer analytics
//! - `reviews` / `top-rated` - Product reviews
//! - `checkout` - Coupon resolution and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use woo_storefront::{WooClient, WooConfig};

mod commands;

#[derive(Parser)]
#[command(name = "woo")]
#[command(author, version, about = "WooCommerce storefront in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save store credentials to the settings file
    Setup {
        /// Store domain (e.g., shop.example.com)
        #[arg(short, long)]
        domain: String,

        /// REST API consumer key (`ck_...`)
        #[arg(short, long)]
        key: String,

        /// REST API consumer secret (`cs_...`)
        #[arg(short, long)]
        secret: String,
    },
    /// Browse the shop grid
    Products {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show the landing page products
    Featured {
        /// Number of products (defaults to the configured value)
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// List product categories
    Categories,
    /// Show a product with its variations and review summary
    Product { id: u64 },
    /// Show order history, newest first
    Orders {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show top clients and the customer list
    Customers {
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Size of each ranking (defaults to the configured value)
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Show the reviews of a product, or the latest reviews store-wide
    Reviews {
        /// Product to show reviews for; omit for the latest reviews
        product_id: Option<u64>,

        /// Number of latest reviews to show
        #[arg(short, long, default_value_t = 100)]
        limit: u32,
    },
    /// Rank products by average rating
    TopRated {
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },
    /// Compute checkout totals, optionally applying a coupon
    Checkout {
        /// Cart subtotal
        #[arg(long)]
        subtotal: Decimal,

        /// Coupon code (case-sensitive)
        #[arg(long)]
        coupon: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("woo_storefront=info,woo_cli=info")),
        )
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
    if let Commands::Setup {
        domain,
        key,
        secret,
    } = &cli.command
    {
        commands::setup::save(domain, key, secret)?;
        return Ok(());
    }

    let config = WooConfig::from_env()?;
    let client = WooClient::new(&config)?;

    match cli.command {
        Commands::Setup { .. } => {}
        Commands::Products { page } => commands::catalog::products(&client, &config, page).await?,
        Commands::Featured { limit } => {
            let limit = limit.unwrap_or(config.display.featured_products);
            commands::catalog::featured(&client, limit).await?;
        }
        Commands::Categories => commands::catalog::categories(&client).await?,
        Commands::Product { id } => commands::catalog::product(&client, id.into()).await?,
        Commands::Orders { page } => commands::orders::history(&client, &config, page).await?,
        Commands::Customers { page, top } => {
            let top = top.unwrap_or(config.display.top_clients);
            commands::orders::customers(&client, &config, page, top).await?;
        }
        Commands::Reviews { product_id, limit } => match product_id {
            Some(id) => commands::reviews::for_product(&client, id.into()).await?,
            None => commands::reviews::latest(&client, limit).await?,
        },
        Commands::TopRated { top } => commands::reviews::top_rated(&client, top).await?,
        Commands::Checkout { subtotal, coupon } => {
            commands::checkout::totals(&client, subtotal, coupon.as_deref()).await?;
        }
    }
    Ok(())
}
