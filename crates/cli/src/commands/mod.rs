//! Shell commands.
//!
//! Each command prints human-readable text, or pretty JSON with `--json`.

pub mod cart;
pub mod catalog;
pub mod wallet;

use oakmint_storefront::session::SessionError;
use serde::Serialize;
use thiserror::Error;

/// Errors from running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
