//! Oakmint Storefront library.
//!
//! The session core of the storefront (catalog, cart, wallet session,
//! connectivity gate, persistence) plus the HTTP backend that serves the
//! catalog feed and readiness endpoint. Both the `oakmint-storefront`
//! binary and the `oakmint` shell are built on it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gate;
pub mod persistence;
pub mod routes;
pub mod session;
pub mod shell;
pub mod state;
pub mod telemetry;
pub mod wallet;
