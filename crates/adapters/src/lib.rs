//! Exchange adapters
//!
//! A venue-independent exchange contract ([`traits::Exchange`],
//! [`traits::OrderEntry`]) and its Kraken implementation. Strategies written
//! against the traits can be retargeted to any venue that has an adapter.
//!
//! # Example
//!
//! ```ignore
//! use adapters::assets::{Asset, TradingPair};
//! use adapters::config::KrakenConfig;
//! use adapters::kraken::KrakenExchange;
//! use adapters::traits::{with_deadline, Exchange};
//! use std::num::NonZeroUsize;
//! use std::time::Duration;
//!
//! let exchange = KrakenExchange::from_config(&KrakenConfig::default())?;
//! let pair = TradingPair::new(Asset::Xlm, Asset::Btc);
//! let depth = NonZeroUsize::new(10).unwrap();
//! let book = with_deadline(Duration::from_secs(5), exchange.get_order_book(&pair, depth)).await?;
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod kraken;
pub mod number;
pub mod traits;

pub use assets::{Asset, AssetConverter, TradingPair};
pub use error::{ErrorKind, ExchangeError, Result};
pub use number::Number;
