use crate::assets::{Asset, AssetConverter, TradingPair};
use crate::error::{ExchangeError, Result};
use crate::number::Number;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

pub type UnixMillis = u64;

// ============================================================================
// Orders
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    pub fn is_buy(&self) -> bool {
        matches!(self, OrderAction::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, OrderAction::Sell)
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Buy => f.write_str("buy"),
            OrderAction::Sell => f.write_str("sell"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub fn is_limit(&self) -> bool {
        matches!(self, OrderType::Limit)
    }

    pub fn is_market(&self) -> bool {
        matches!(self, OrderType::Market)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => f.write_str("limit"),
            OrderType::Market => f.write_str("market"),
        }
    }
}

/// Order submitted through [`OrderEntry::add_order`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewOrder {
    pub pair: TradingPair,
    pub action: OrderAction,
    pub order_type: OrderType,
    pub price: Number,
    pub volume: Number,
}

/// Venue-assigned order transaction id
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub const SIMULATED: &'static str = "simulated";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOrderResult {
    Cancelled,
    Pending,
    Failed,
}

/// Order resting on the account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenOrder {
    pub pair: TradingPair,
    pub order_id: TransactionId,
    pub action: OrderAction,
    pub order_type: OrderType,
    pub price: Number,
    pub volume: Number,
    pub remaining: Number,
    pub timestamp: UnixMillis,
}

impl fmt::Display for OpenOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opened = chrono::DateTime::from_timestamp_millis(self.timestamp as i64)
            .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
            .unwrap_or_else(|| self.timestamp.to_string());
        write!(
            f,
            "OpenOrder[id={}, pair={}, action={}, type={}, price={}, volume={}, remaining={}, opened={}]",
            self.order_id,
            self.pair,
            self.action,
            self.order_type,
            self.price,
            self.volume,
            self.remaining,
            opened
        )
    }
}

pub type OpenOrdersByPair = HashMap<TradingPair, Vec<OpenOrder>>;

// ============================================================================
// Market Data
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticker {
    pub ask_price: Number,
    pub bid_price: Number,
    pub last_price: Number,
}

/// One price level on one side of a book
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBookLevel {
    pub pair: TradingPair,
    pub price: Number,
    pub volume: Number,
    pub action: OrderAction,
    pub order_type: OrderType,
    pub timestamp: Option<UnixMillis>,
}

/// Asks ascending by price, bids descending
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBook {
    pair: TradingPair,
    asks: Vec<OrderBookLevel>,
    bids: Vec<OrderBookLevel>,
}

impl OrderBook {
    /// Sorts both sides, truncates them to `depth` and checks the top of book
    ///
    /// Levels are expected to be stamped already (asks Sell, bids Buy).
    pub fn new(
        pair: TradingPair,
        mut asks: Vec<OrderBookLevel>,
        mut bids: Vec<OrderBookLevel>,
        depth: NonZeroUsize,
    ) -> Result<Self> {
        if asks.iter().any(|l| !l.action.is_sell()) || bids.iter().any(|l| !l.action.is_buy()) {
            return Err(ExchangeError::parse(format!("order book for {} has levels on the wrong side", pair)));
        }

        asks.sort_by(|a, b| a.price.value().cmp(&b.price.value()));
        bids.sort_by(|a, b| b.price.value().cmp(&a.price.value()));
        asks.truncate(depth.get());
        bids.truncate(depth.get());

        if let (Some(ask), Some(bid)) = (asks.first(), bids.first()) {
            if bid.price.value() > ask.price.value() {
                return Err(ExchangeError::parse(format!(
                    "crossed book for {}: bid {} > ask {}",
                    pair, bid.price, ask.price
                )));
            }
        }

        Ok(Self { pair, asks, bids })
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    pub fn asks(&self) -> &[OrderBookLevel] {
        &self.asks
    }

    pub fn bids(&self) -> &[OrderBookLevel] {
        &self.bids
    }

    pub fn best_ask(&self) -> Option<&OrderBookLevel> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&OrderBookLevel> {
        self.bids.first()
    }
}

/// Executed trade, public or account-scoped
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trade {
    pub pair: TradingPair,
    pub action: OrderAction,
    pub order_type: OrderType,
    pub price: Number,
    pub base_volume: Number,
    pub quote_volume: Number,
    pub fee: Option<Number>,
    pub timestamp: UnixMillis,
    pub trade_id: Option<String>,
    pub order_id: Option<TransactionId>,
}

/// Opaque continuation token for paginated trade streams
///
/// Callers hand back whatever the adapter returned and must not inspect it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cursor {
    Sequence(i64),
    Token(String),
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Sequence(n) => write!(f, "{}", n),
            Cursor::Token(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradeBatch {
    pub trades: Vec<Trade>,
    pub cursor: Option<Cursor>,
}

// ============================================================================
// Exchange Contract
// ============================================================================

/// Read side of an exchange, implemented once per venue
///
/// Every operation performs network I/O. Implementations keep no per-call
/// state on `self`, so one instance may serve concurrent callers.
#[async_trait::async_trait]
pub trait Exchange: Send + Sync {
    fn asset_converter(&self) -> &AssetConverter;

    /// One ticker per requested pair, or an error for the whole call
    async fn get_ticker_price(&self, pairs: &[TradingPair]) -> Result<HashMap<TradingPair, Ticker>>;

    /// One balance per requested asset; unheld assets are zero
    async fn get_account_balances(&self, assets: &[Asset]) -> Result<HashMap<Asset, Number>>;

    async fn get_order_book(&self, pair: &TradingPair, depth: NonZeroUsize) -> Result<OrderBook>;

    /// Public trades strictly after `cursor`, or the earliest page when `None`
    async fn get_trades(&self, pair: &TradingPair, cursor: Option<Cursor>) -> Result<TradeBatch>;

    /// Account trades across all pairs, `start` inclusive and `end` exclusive
    async fn get_trade_history(&self, start: Option<Cursor>, end: Option<Cursor>) -> Result<TradeBatch>;

    async fn get_open_orders(&self) -> Result<OpenOrdersByPair>;
}

/// Mutating side of an exchange
#[async_trait::async_trait]
pub trait OrderEntry: Exchange {
    async fn add_order(&self, order: &NewOrder) -> Result<TransactionId>;
    async fn cancel_order(&self, txid: &TransactionId) -> Result<CancelOrderResult>;
}

/// Runs `fut` under a deadline; expiry drops the call with no partial result
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(res) => res,
        Err(_) => Err(ExchangeError::DeadlineExceeded(deadline)),
    }
}
