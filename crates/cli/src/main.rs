//! Saffron CLI - local cart inspection and store queries.
//!
//! # Usage
//!
//! ```bash
//! # Show the locally persisted cart
//! saffron cart show
//!
//! # Add two units of product 42 to the local cart
//! saffron cart add -p 42 -q 2
//!
//! # List the store's payment gateways
//! saffron gateways
//!
//! # Fetch an order by id
//! saffron order 1723
//!
//! # Preview the UPI deep link for an amount
//! saffron upi-link -a 220.00 -n "Order 1723"
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and edit the locally persisted cart
//! - `gateways` - List the store's payment gateways
//! - `product` - Fetch a product
//! - `order` - Fetch an order
//! - `upi-link` - Preview the UPI deep link for an amount

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "saffron")]
#[command(author, version, about = "Saffron Cart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the locally persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List the store's payment gateways
    Gateways,
    /// Fetch a product by id
    Product {
        /// Product id
        id: i64,
    },
    /// Fetch an order by id
    Order {
        /// Order id
        id: i64,
    },
    /// Preview the UPI deep link for an amount
    UpiLink {
        /// Amount in the store currency
        #[arg(short, long)]
        amount: Decimal,

        /// Transaction note shown in the UPI app
        #[arg(short, long, default_value = "Saffron Cart order")]
        note: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart contents and totals
    Show,
    /// Add a product to the cart (fetched from the store)
    Add {
        /// Product id
        #[arg(short, long)]
        product: i64,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        #[arg(short, long)]
        product: i64,
    },
    /// Empty the cart
    Clear,
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
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show().await?,
            CartAction::Add { product, quantity } => {
                commands::cart::add(product, quantity).await?;
            }
            CartAction::Remove { product } => commands::cart::remove(product).await?,
            CartAction::Clear => commands::cart::clear().await?,
        },
        Commands::Gateways => commands::store::gateways().await?,
        Commands::Product { id } => commands::store::product(id).await?,
        Commands::Order { id } => commands::store::order(id).await?,
        Commands::UpiLink { amount, note } => commands::upi::preview(amount, &note)?,
    }
    Ok(())
}
