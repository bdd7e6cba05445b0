//! Oakmint CLI - terminal shell for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Connect a wallet (required before anything else is shown)
//! oakmint wallet connect
//!
//! # Browse
//! oakmint catalog featured
//! oakmint catalog search chair
//! oakmint catalog category sofas
//! oakmint catalog show 1
//!
//! # Build a cart
//! oakmint cart add 1 --color Sage --quantity 2
//! oakmint cart update 1 --color Sage 0
//! oakmint cart show
//! ```
//!
//! # Startup
//!
//! Every invocation first waits for the backend readiness endpoint, then
//! rehydrates the session from the data directory. Catalog and cart
//! commands are refused until the wallet is connected.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use oakmint_storefront::config::ShellConfig;
use oakmint_storefront::gate::Connectivity;
use oakmint_storefront::session::Session;
use oakmint_storefront::telemetry;
use thiserror::Error;

mod commands;
mod startup;

#[derive(Parser)]
#[command(name = "oakmint")]
#[command(author, version, about = "Oakmint storefront shell")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wallet connection
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Bestsellers and new arrivals
    Featured,
    /// Search by name, description, category, or material
    Search { query: String },
    /// List a category ("all" lists everything)
    Category { slug: String },
    /// Show one product
    Show { id: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a product
    Add {
        id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[arg(short, long)]
        color: Option<String>,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        id: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        #[arg(short, long)]
        color: Option<String>,
    },
    /// Remove a line
    Remove {
        id: String,

        #[arg(short, long)]
        color: Option<String>,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WalletAction {
    /// Show the connection state
    Status,
    /// Request an account from the wallet provider
    Connect,
    /// Forget the connected account
    Disconnect,
}

/// Errors surfaced by the shell itself.
#[derive(Debug, Error)]
enum CliError {
    /// Content was requested from behind the connect overlay.
    #[error("Connect a wallet first: oakmint wallet connect")]
    Locked,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = ShellConfig::from_env().expect("Failed to load configuration");

    let _sentry_guard = telemetry::init_sentry(&config.sentry);
    telemetry::init_tracing("oakmint=info,oakmint_storefront=info");

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ShellConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let connectivity = startup::wait_for_backend(config, &client).await?;
    let mut session = startup::open_session(config, &client).await?;
    let json = cli.json;

    match cli.command {
        Commands::Wallet { action } => match action {
            WalletAction::Status => commands::wallet::status(&session, connectivity, json)?,
            WalletAction::Connect => commands::wallet::connect(&session, connectivity, json).await?,
            WalletAction::Disconnect => commands::wallet::disconnect(&session, connectivity, json)?,
        },
        Commands::Catalog { action } => {
            require_app(&session, connectivity, json)?;
            match action {
                CatalogAction::Featured => commands::catalog::featured(&session, json)?,
                CatalogAction::Search { query } => commands::catalog::search(&session, &query, json)?,
                CatalogAction::Category { slug } => commands::catalog::category(&session, &slug, json)?,
                CatalogAction::Show { id } => commands::catalog::show(&session, &id, json)?,
            }
        }
        Commands::Cart { action } => {
            require_app(&session, connectivity, json)?;
            match action {
                CartAction::Show => commands::cart::show(&session, json)?,
                CartAction::Add { id, quantity, color } => {
                    commands::cart::add(&mut session, &id, quantity, color.as_deref(), json)?;
                }
                CartAction::Update { id, quantity, color } => {
                    commands::cart::update(&mut session, &id, color.as_deref(), quantity, json)?;
                }
                CartAction::Remove { id, color } => {
                    commands::cart::remove(&mut session, &id, color.as_deref(), json)?;
                }
                CartAction::Clear => commands::cart::clear(&mut session, json)?,
            }
        }
    }
    Ok(())
}

/// Render the overlay and refuse unless the storefront is unlocked.
fn require_app(session: &Session, connectivity: Connectivity, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let screen = session.screen(connectivity);
    if screen.unlocks_content() {
        return Ok(());
    }
    commands::wallet::render_screen(&screen, json)?;
    Err(CliError::Locked.into())
}
