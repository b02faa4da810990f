//! Woo Storefront Core - Shared types library.
//!
//! This crate provides common types used across all storefront components:
//! - `storefront` - WooCommerce client, collection fetching, aggregation
//! - `cli` - The `woo` command-line shell
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, statuses
//!   and date ranges

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
