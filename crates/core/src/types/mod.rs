//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod date_range;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use date_range::{DateRange, DateRangeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, parse_amount};
pub use status::*;
