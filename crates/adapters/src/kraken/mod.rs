//! Kraken Exchange Adapter
//!
//! # Module Structure
//!
//! - [`account`] - Authentication, HTTP client, response envelope and type converters
//! - [`spot`] - [`KrakenExchange`], the contract implementation for Kraken Spot

pub mod account;
pub mod spot;

pub use account::{KrakenAuth, KrakenRestClient};
pub use spot::KrakenExchange;
