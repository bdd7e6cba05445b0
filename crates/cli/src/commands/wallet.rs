//! Wallet commands and the connect overlay.

#![allow(clippy::print_stdout)]

use oakmint_storefront::gate::Connectivity;
use oakmint_storefront::session::Session;
use oakmint_storefront::shell::Screen;
use oakmint_storefront::wallet::WalletSnapshot;
use serde_json::json;

use super::{CommandError, print_json};

/// Show the connection state and what the shell would render.
pub fn status(session: &Session, connectivity: Connectivity, json: bool) -> Result<(), CommandError> {
    let snapshot = session.wallet().snapshot();
    if json {
        return print_json(&snapshot_json(&snapshot));
    }
    print_snapshot(&snapshot);
    render_screen(&session.screen(connectivity), json)
}

/// Ask the provider for an account.
pub async fn connect(session: &Session, connectivity: Connectivity, json: bool) -> Result<(), CommandError> {
    let snapshot = session.wallet().connect().await;
    if json {
        return print_json(&snapshot_json(&snapshot));
    }
    render_screen(&session.screen(connectivity), json)
}

/// Forget the connected account.
pub fn disconnect(session: &Session, connectivity: Connectivity, json: bool) -> Result<(), CommandError> {
    let snapshot = session.wallet().disconnect();
    if json {
        return print_json(&snapshot_json(&snapshot));
    }
    println!("Wallet disconnected");
    render_screen(&session.screen(connectivity), json)
}

/// Render the screen the shell is on.
pub fn render_screen(screen: &Screen, json: bool) -> Result<(), CommandError> {
    if json {
        let value = match screen {
            Screen::WaitingForBackend { attempts } => json!({
                "screen": "waiting_for_backend",
                "attempts": attempts,
            }),
            Screen::ConnectWallet(prompt) => json!({
                "screen": "connect_wallet",
                "connecting": prompt.connecting,
                "error": prompt.error.as_ref().map(ToString::to_string),
                "installUrl": prompt.install_url,
            }),
            Screen::App => json!({ "screen": "app" }),
        };
        return print_json(&value);
    }

    match screen {
        Screen::WaitingForBackend { attempts } => {
            println!("Connecting to the server... (attempt {attempts})");
        }
        Screen::ConnectWallet(prompt) => {
            println!("Connect your wallet to continue.");
            if prompt.connecting {
                println!("Connecting...");
            }
            if let Some(error) = &prompt.error {
                println!("Last attempt failed: {error}");
            }
            if let Some(url) = prompt.install_url {
                println!("Don't have a wallet? Install one here: {url}");
            }
            println!("Run `oakmint wallet connect` to connect.");
        }
        Screen::App => println!("Storefront unlocked."),
    }
    Ok(())
}

fn print_snapshot(snapshot: &WalletSnapshot) {
    match &snapshot.address {
        Some(address) => println!("Wallet {} ({})", snapshot.status, address.short()),
        None => println!("Wallet {}", snapshot.status),
    }
}

fn snapshot_json(snapshot: &WalletSnapshot) -> serde_json::Value {
    json!({
        "status": snapshot.status,
        "address": snapshot.address,
        "error": snapshot.last_error.as_ref().map(ToString::to_string),
        "errorKind": snapshot.last_error_kind(),
    })
}
