//! Subcommand implementations.

pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod reviews;
pub mod setup;
