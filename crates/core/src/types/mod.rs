//! Core types for Oakmint.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use address::{AddressError, WalletAddress};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError, RateTable};
pub use product::{Category, Dimensions, Product, ProductError};
pub use status::*;
