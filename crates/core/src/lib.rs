//! Oakmint Core - Shared types library.
//!
//! This crate provides common types used across all Oakmint components:
//! - `storefront` - Session core (catalog, cart, wallet) and the catalog backend
//! - `cli` - Terminal shell for browsing and building a cart
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, wallet addresses, prices, products, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
