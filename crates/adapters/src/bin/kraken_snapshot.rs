//! Kraken market snapshot
//!
//! Prints ticker, top of book and recent trades for one pair. When
//! `KRAKEN_API_KEY` / `KRAKEN_API_SECRET` are set, also prints balances,
//! open orders and recent account trades.
//!
//! Usage:
//!   cargo run --bin kraken_snapshot -- [BASE/QUOTE] [DEPTH]

use adapters::assets::{Asset, TradingPair};
use adapters::config::KrakenConfig;
use adapters::kraken::KrakenExchange;
use adapters::traits::{with_deadline, Exchange};
use anyhow::{Context, Result};
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CALL_DEADLINE: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let pair: TradingPair = args
        .next()
        .unwrap_or_else(|| "XLM/BTC".to_string())
        .parse()
        .context("pair must look like XLM/BTC")?;
    let depth = args
        .next()
        .map(|d| d.parse::<usize>())
        .transpose()
        .context("depth must be a number")?
        .and_then(NonZeroUsize::new)
        .unwrap_or(NonZeroUsize::MIN.saturating_add(9));

    let config = KrakenConfig::from_env()?;
    let exchange = KrakenExchange::from_config(&config)?;
    info!(%pair, depth = depth.get(), simulated = exchange.is_simulated(), "Kraken snapshot");

    let tickers = with_deadline(CALL_DEADLINE, exchange.get_ticker_price(&[pair])).await?;
    if let Some(t) = tickers.get(&pair) {
        println!("{} ticker: bid={} ask={} last={}", pair, t.bid_price, t.ask_price, t.last_price);
    }

    let book = with_deadline(CALL_DEADLINE, exchange.get_order_book(&pair, depth)).await?;
    println!("{} book (depth {}):", book.pair(), depth);
    for level in book.asks().iter().rev() {
        println!("    ask {:>20} x {}", level.price, level.volume);
    }
    for level in book.bids() {
        println!("    bid {:>20} x {}", level.price, level.volume);
    }

    let trades = with_deadline(CALL_DEADLINE, exchange.get_trades(&pair, None)).await?;
    println!("{} recent trades: {} (cursor {:?})", pair, trades.trades.len(), trades.cursor);
    for trade in trades.trades.iter().rev().take(5) {
        println!("    {} {} @ {} ({})", trade.action, trade.base_volume, trade.price, trade.timestamp);
    }

    if !exchange.has_credentials() {
        warn!("No Kraken credentials configured, skipping account data");
        return Ok(());
    }

    let assets: Vec<Asset> = exchange.asset_converter().assets().collect();
    let balances = with_deadline(CALL_DEADLINE, exchange.get_account_balances(&assets)).await?;
    for (asset, balance) in &balances {
        println!("Balance {} = {:.8}", asset, balance.as_f64());
    }

    let open = with_deadline(CALL_DEADLINE, exchange.get_open_orders()).await?;
    for (pair, orders) in &open {
        println!("Open Orders for pair: {}", pair);
        for order in orders {
            println!("    {}", order);
        }
    }

    let history = with_deadline(CALL_DEADLINE, exchange.get_trade_history(None, None)).await?;
    println!("Account trades: {} (cursor {:?})", history.trades.len(), history.cursor);

    Ok(())
}
