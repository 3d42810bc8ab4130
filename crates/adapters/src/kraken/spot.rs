//! Kraken Spot Exchange Adapter
//!
//! Implements [`Exchange`] and [`OrderEntry`] over Kraken's Spot REST API.
//!
//! # Translation
//!
//! - Requests: each pair is sent as `to_venue(base) + delimiter + to_venue(quote)`
//!   (`XLM/BTC` -> `XXLMXXBT` with Kraken's empty delimiter)
//! - Responses: every venue code goes back through the converter; an unknown code
//!   fails the call with `UnsupportedAsset`
//! - Numbers: venue strings are parsed as exact decimals, never through f64
//!
//! # Simulation
//!
//! With `is_simulated` set, [`OrderEntry`] calls return synthetic success without
//! touching the network. Reads always hit the live venue.
//!
//! # Example Usage
//!
//! ```ignore
//! use adapters::assets::{Asset, TradingPair};
//! use adapters::kraken::KrakenExchange;
//! use adapters::traits::Exchange;
//!
//! let exchange = KrakenExchange::from_config(&KrakenConfig::from_env()?)?;
//! let pair = TradingPair::new(Asset::Xlm, Asset::Btc);
//! let tickers = exchange.get_ticker_price(&[pair]).await?;
//! println!("XLM/BTC ask = {}", tickers[&pair].ask_price);
//! ```
//!
//! # API Documentation
//!
//! - Kraken Spot REST API: <https://docs.kraken.com/api/docs/guides/spot-rest-api>

use crate::assets::{Asset, AssetConverter, TradingPair};
use crate::config::KrakenConfig;
use crate::error::{ExchangeError, Result};
use crate::kraken::account::{
    converters, KrakenRestClient, ADD_ORDER_PATH, BALANCE_PATH, CANCEL_ORDER_PATH, DEPTH_PATH,
    OPEN_ORDERS_PATH, TICKER_PATH, TRADES_HISTORY_PATH, TRADES_PATH,
};
use crate::number::Number;
use crate::traits::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::str::FromStr;
use tracing::{debug, info};

// ============================================================================
// Main Adapter Struct
// ============================================================================

/// Kraken implementation of the exchange contract
///
/// All fields are read-only after construction and every call keeps its state
/// on the stack, so an instance can be shared behind an `Arc` by concurrent
/// callers. The REST client is cheap to clone and pools its connections.
#[derive(Clone, Debug)]
pub struct KrakenExchange {
    /// Canonical asset <-> Kraken asset code (`XXBT`)
    asset_converter: AssetConverter,

    /// Canonical asset <-> Kraken alt name (`XBT`), as used in order descriptions
    open_orders_converter: AssetConverter,

    api: KrakenRestClient,

    /// Joins base and quote codes into a pair symbol; empty for Kraken
    delimiter: String,

    /// Order entry is a no-op when set
    is_simulated: bool,
}

impl KrakenExchange {
    pub fn new(
        asset_converter: AssetConverter,
        api: KrakenRestClient,
        delimiter: impl Into<String>,
        is_simulated: bool,
    ) -> Self {
        Self {
            asset_converter,
            open_orders_converter: AssetConverter::kraken_alt_names(),
            api,
            delimiter: delimiter.into(),
            is_simulated,
        }
    }

    /// Kraken tables, empty delimiter and an HTTP client built from `config`
    pub fn from_config(config: &KrakenConfig) -> Result<Self> {
        let api = KrakenRestClient::from_config(config)?;
        Ok(Self::new(AssetConverter::kraken(), api, "", config.is_simulated))
    }

    pub fn with_open_orders_converter(mut self, converter: AssetConverter) -> Self {
        self.open_orders_converter = converter;
        self
    }

    pub fn is_simulated(&self) -> bool {
        self.is_simulated
    }

    /// Whether private endpoints can be called
    pub fn has_credentials(&self) -> bool {
        self.api.is_authenticated()
    }

    fn venue_pair(&self, pair: &TradingPair) -> Result<String> {
        self.asset_converter.pair_to_venue(pair, &self.delimiter)
    }

    /// Picks the response entry for `symbol`, falling back to any key that
    /// translates to the same pair
    fn entry_for<'a, T>(&self, entries: &'a HashMap<String, T>, symbol: &str, pair: &TradingPair) -> Option<&'a T> {
        entries.get(symbol).or_else(|| {
            entries.iter().find_map(|(key, value)| {
                match self.asset_converter.pair_from_venue(key, &self.delimiter) {
                    Ok(p) if p == *pair => Some(value),
                    _ => None,
                }
            })
        })
    }
}

// ============================================================================
// REST API Types
// ============================================================================
//
// Kraken-specific response shapes, converted to contract types before they
// leave this module.

#[derive(Debug, Deserialize)]
struct KrakenTickerData {
    a: Vec<String>, // ask [price, whole lot volume, lot volume]
    b: Vec<String>, // bid [price, whole lot volume, lot volume]
    c: Vec<String>, // last trade [price, lot volume]
}

#[derive(Debug, Deserialize)]
struct KrakenDepthData {
    #[serde(default)]
    asks: Vec<Vec<Value>>, // [price, volume, timestamp]
    #[serde(default)]
    bids: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct KrakenTradesHistoryResult {
    #[serde(default)]
    trades: HashMap<String, KrakenHistoryTrade>,
    /// Trades matching the query across all pages
    #[serde(default)]
    count: usize,
}

#[derive(Debug, Deserialize)]
struct KrakenHistoryTrade {
    ordertxid: String,
    pair: String,
    time: Value,
    #[serde(rename = "type")]
    side: String,
    ordertype: String,
    price: String,
    cost: String,
    fee: String,
    vol: String,
}

#[derive(Debug, Deserialize)]
struct KrakenOpenOrdersResult {
    #[serde(default)]
    open: HashMap<String, KrakenOrderDetails>,
}

#[derive(Debug, Deserialize)]
struct KrakenOrderDetails {
    opentm: Value,
    descr: KrakenOrderDescr,
    vol: String,
    vol_exec: String,
    #[serde(default)]
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KrakenOrderDescr {
    pair: String,
    #[serde(rename = "type")]
    side: String,
    ordertype: String,
    #[serde(default)]
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KrakenAddOrderResult {
    txid: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KrakenCancelOrderResult {
    count: usize,
    #[serde(default)]
    pending: bool,
}

// ============================================================================
// Helpers
// ============================================================================

/// Exact decimal from a JSON string or number
fn decimal_from_value(value: &Value, field: &str) -> Result<Decimal> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(ExchangeError::parse(format!("{}: expected a number, got {}", field, other))),
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| ExchangeError::parse(format!("{}: not a decimal: {}", field, raw)))
}

fn str_at<'a>(row: &'a [Value], idx: usize, field: &str) -> Result<&'a str> {
    row.get(idx)
        .and_then(Value::as_str)
        .ok_or_else(|| ExchangeError::parse(format!("{}: missing string at index {}", field, idx)))
}

fn number_at(row: &[Value], idx: usize, field: &str) -> Result<Number> {
    Number::parse_non_negative(str_at(row, idx, field)?, field)
}

/// Unix seconds (possibly fractional) to milliseconds
fn seconds_to_millis(seconds: Decimal, field: &str) -> Result<UnixMillis> {
    (seconds * Decimal::ONE_THOUSAND)
        .trunc()
        .to_u64()
        .ok_or_else(|| ExchangeError::parse(format!("{}: invalid timestamp {}", field, seconds)))
}

/// Milliseconds rendered as the fractional unix seconds Kraken accepts
fn millis_to_seconds_param(ms: i64) -> String {
    format!("{}.{:03}", ms.div_euclid(1000), ms.rem_euclid(1000))
}

fn sequence_cursor(cursor: &Cursor) -> Result<i64> {
    match cursor {
        Cursor::Sequence(n) => Ok(*n),
        Cursor::Token(t) => Err(ExchangeError::parse(format!("cursor {:?} was not issued by kraken", t))),
    }
}

/// History bounds are unix milliseconds and must be positive
fn history_bound(cursor: &Cursor, field: &str) -> Result<i64> {
    let ms = sequence_cursor(cursor)?;
    if ms <= 0 {
        return Err(ExchangeError::parse(format!("{} cursor must be positive, got {}", field, ms)));
    }
    Ok(ms)
}

fn positive_price(raw: &str, field: &str) -> Result<Number> {
    let n = Number::parse_non_negative(raw, field)?;
    if !n.is_positive() {
        return Err(ExchangeError::parse(format!("{} must be positive, got {}", field, raw)));
    }
    Ok(n)
}

fn first_field<'a>(values: &'a [String], field: &str) -> Result<&'a str> {
    values
        .first()
        .map(String::as_str)
        .ok_or_else(|| ExchangeError::parse(format!("{}: empty array", field)))
}

impl KrakenExchange {
    fn parse_ticker(&self, pair: &TradingPair, data: &KrakenTickerData) -> Result<Ticker> {
        let ticker = Ticker {
            ask_price: positive_price(first_field(&data.a, "ask")?, "ask")?,
            bid_price: positive_price(first_field(&data.b, "bid")?, "bid")?,
            last_price: positive_price(first_field(&data.c, "last")?, "last")?,
        };
        if ticker.bid_price.value() > ticker.ask_price.value() {
            return Err(ExchangeError::parse(format!(
                "ticker for {} has bid {} above ask {}",
                pair, ticker.bid_price, ticker.ask_price
            )));
        }
        Ok(ticker)
    }

    fn parse_levels(&self, pair: &TradingPair, rows: &[Vec<Value>], action: OrderAction) -> Result<Vec<OrderBookLevel>> {
        rows.iter()
            .map(|row| {
                let timestamp = match row.get(2) {
                    Some(v) => Some(seconds_to_millis(decimal_from_value(v, "level timestamp")?, "level timestamp")?),
                    None => None,
                };
                Ok(OrderBookLevel {
                    pair: *pair,
                    price: number_at(row, 0, "level price")?,
                    volume: number_at(row, 1, "level volume")?,
                    action,
                    order_type: OrderType::Limit,
                    timestamp,
                })
            })
            .collect()
    }

    fn parse_public_trade(&self, pair: &TradingPair, row: &[Value]) -> Result<Trade> {
        let price = number_at(row, 0, "trade price")?;
        let base_volume = number_at(row, 1, "trade volume")?;
        let time = row
            .get(2)
            .ok_or_else(|| ExchangeError::parse("trade time missing"))?;
        let trade_id = row.get(6).and_then(|v| match v {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        });

        Ok(Trade {
            pair: *pair,
            action: converters::from_kraken_side(str_at(row, 3, "trade side")?)?,
            order_type: converters::from_kraken_order_type(str_at(row, 4, "trade type")?)?,
            price,
            base_volume,
            quote_volume: price.checked_mul(base_volume)?,
            fee: None,
            timestamp: seconds_to_millis(decimal_from_value(time, "trade time")?, "trade time")?,
            trade_id,
            order_id: None,
        })
    }

    fn parse_history_trade(&self, txid: &str, t: &KrakenHistoryTrade) -> Result<Trade> {
        Ok(Trade {
            pair: self.asset_converter.pair_from_venue(&t.pair, &self.delimiter)?,
            action: converters::from_kraken_side(&t.side)?,
            order_type: converters::from_kraken_order_type(&t.ordertype)?,
            price: Number::parse_non_negative(&t.price, "price")?,
            base_volume: Number::parse_non_negative(&t.vol, "vol")?,
            quote_volume: Number::parse_non_negative(&t.cost, "cost")?,
            fee: Some(Number::parse_non_negative(&t.fee, "fee")?),
            timestamp: seconds_to_millis(decimal_from_value(&t.time, "time")?, "time")?,
            trade_id: Some(txid.to_string()),
            order_id: Some(TransactionId::new(t.ordertxid.clone())),
        })
    }

    fn parse_open_order(&self, txid: &str, d: &KrakenOrderDetails) -> Result<OpenOrder> {
        let pair = self.open_orders_converter.pair_from_venue(&d.descr.pair, "")?;
        let volume = Number::parse_non_negative(&d.vol, "vol")?;
        let executed = Number::parse_non_negative(&d.vol_exec, "vol_exec")?;
        let remaining = volume - executed;
        if remaining.is_negative() {
            return Err(ExchangeError::parse(format!(
                "order {} executed {} of {}",
                txid, executed, volume
            )));
        }

        // Market orders describe price as "0"; the order's own price is better when present
        let mut price = match &d.descr.price {
            Some(p) => Number::parse_non_negative(p, "descr.price")?,
            None => Number::ZERO,
        };
        if price.is_zero() {
            if let Some(p) = &d.price {
                price = Number::parse_non_negative(p, "price")?;
            }
        }

        Ok(OpenOrder {
            pair,
            order_id: TransactionId::new(txid),
            action: converters::from_kraken_side(&d.descr.side)?,
            order_type: converters::from_kraken_order_type(&d.descr.ordertype)?,
            price,
            volume,
            remaining,
            timestamp: seconds_to_millis(decimal_from_value(&d.opentm, "opentm")?, "opentm")?,
        })
    }
}

// ============================================================================
// Exchange Contract
// ============================================================================

#[async_trait::async_trait]
impl Exchange for KrakenExchange {
    fn asset_converter(&self) -> &AssetConverter {
        &self.asset_converter
    }

    async fn get_ticker_price(&self, pairs: &[TradingPair]) -> Result<HashMap<TradingPair, Ticker>> {
        if pairs.is_empty() {
            return Ok(HashMap::new());
        }

        let mut symbols = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let symbol = self.venue_pair(pair)?;
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        let mut params = HashMap::new();
        params.insert("pair".to_string(), symbols.join(","));

        let result: HashMap<String, KrakenTickerData> = self.api.get_public(TICKER_PATH, Some(params)).await?;

        let mut tickers = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            let symbol = self.venue_pair(pair)?;
            let data = self
                .entry_for(&result, &symbol, pair)
                .ok_or_else(|| ExchangeError::parse(format!("venue returned no ticker for {}", pair)))?;
            tickers.insert(*pair, self.parse_ticker(pair, data)?);
        }

        debug!(count = tickers.len(), "kraken tickers");
        Ok(tickers)
    }

    async fn get_account_balances(&self, assets: &[Asset]) -> Result<HashMap<Asset, Number>> {
        // Translate first so unsupported assets fail before any I/O
        let codes = assets
            .iter()
            .map(|a| self.asset_converter.to_venue(*a).map(|c| (*a, c.to_string())))
            .collect::<Result<Vec<_>>>()?;

        let result: HashMap<String, String> = self.api.post_private(BALANCE_PATH, HashMap::new()).await?;

        let mut balances = HashMap::with_capacity(codes.len());
        for (asset, code) in codes {
            let balance = match result.get(&code) {
                Some(raw) => Number::parse_non_negative(raw, &code)?,
                None => Number::ZERO,
            };
            balances.insert(asset, balance);
        }

        debug!(count = balances.len(), "kraken balances");
        Ok(balances)
    }

    async fn get_order_book(&self, pair: &TradingPair, depth: NonZeroUsize) -> Result<OrderBook> {
        let symbol = self.venue_pair(pair)?;
        let mut params = HashMap::new();
        params.insert("pair".to_string(), symbol.clone());
        params.insert("count".to_string(), depth.to_string());

        let result: HashMap<String, KrakenDepthData> = self.api.get_public(DEPTH_PATH, Some(params)).await?;
        let data = self
            .entry_for(&result, &symbol, pair)
            .ok_or_else(|| ExchangeError::parse(format!("venue returned no book for {}", pair)))?;

        let asks = self.parse_levels(pair, &data.asks, OrderAction::Sell)?;
        let bids = self.parse_levels(pair, &data.bids, OrderAction::Buy)?;
        let book = OrderBook::new(*pair, asks, bids, depth)?;

        debug!(%pair, asks = book.asks().len(), bids = book.bids().len(), "kraken order book");
        Ok(book)
    }

    async fn get_trades(&self, pair: &TradingPair, cursor: Option<Cursor>) -> Result<TradeBatch> {
        let symbol = self.venue_pair(pair)?;
        let since = cursor.as_ref().map(sequence_cursor).transpose()?;

        let mut params = HashMap::new();
        params.insert("pair".to_string(), symbol.clone());
        if let Some(since) = since {
            params.insert("since".to_string(), since.to_string());
        }

        let mut result: HashMap<String, Value> = self.api.get_public(TRADES_PATH, Some(params)).await?;

        let last = result
            .remove("last")
            .ok_or_else(|| ExchangeError::parse("trades response has no last cursor"))?;
        let last = decimal_from_value(&last, "last")?
            .to_i64()
            .filter(|n| *n > 0)
            .ok_or_else(|| ExchangeError::parse(format!("invalid last cursor {}", last)))?;

        let rows: Vec<Vec<Value>> = match self.entry_for(&result, &symbol, pair) {
            Some(v) => serde_json::from_value(v.clone())?,
            None => return Err(ExchangeError::parse(format!("venue returned no trades for {}", pair))),
        };

        let mut trades = rows
            .iter()
            .map(|row| self.parse_public_trade(pair, row))
            .collect::<Result<Vec<_>>>()?;
        trades.sort_by_key(|t| t.timestamp);

        let cursor = match since {
            Some(since) if trades.is_empty() => since,
            Some(since) => last.max(since),
            None => last,
        };

        debug!(%pair, count = trades.len(), cursor, "kraken trades");
        Ok(TradeBatch {
            trades,
            cursor: Some(Cursor::Sequence(cursor)),
        })
    }

    async fn get_trade_history(&self, start: Option<Cursor>, end: Option<Cursor>) -> Result<TradeBatch> {
        let start_ms = start.as_ref().map(|c| history_bound(c, "start")).transpose()?;
        let end_ms = end.as_ref().map(|c| history_bound(c, "end")).transpose()?;

        let mut params = HashMap::new();
        // Kraken's start bound is exclusive; widen by 1ms and filter below
        if let Some(s) = start_ms {
            params.insert("start".to_string(), millis_to_seconds_param(s - 1));
        }
        if let Some(e) = end_ms {
            params.insert("end".to_string(), millis_to_seconds_param(e));
        }

        // Kraken pages newest first; walk `ofs` until `count` trades are in hand
        let mut raw_trades: HashMap<String, KrakenHistoryTrade> = HashMap::new();
        let mut offset = 0usize;
        loop {
            let mut page_params = params.clone();
            page_params.insert("ofs".to_string(), offset.to_string());

            let page: KrakenTradesHistoryResult = self.api.post_private(TRADES_HISTORY_PATH, page_params).await?;
            let page_len = page.trades.len();
            let before = raw_trades.len();
            raw_trades.extend(page.trades);

            if raw_trades.len() >= page.count {
                break;
            }
            if page_len == 0 || raw_trades.len() == before {
                return Err(ExchangeError::parse(format!(
                    "trade history stopped at offset {} with {} of {} trades",
                    offset,
                    raw_trades.len(),
                    page.count
                )));
            }
            offset += page_len;
            debug!(offset, collected = raw_trades.len(), total = page.count, "kraken trade history page");
        }

        let mut trades = Vec::with_capacity(raw_trades.len());
        for (txid, raw) in &raw_trades {
            let trade = self.parse_history_trade(txid, raw)?;
            let ts = trade.timestamp as i64;
            if start_ms.is_some_and(|s| ts < s) || end_ms.is_some_and(|e| ts >= e) {
                continue;
            }
            trades.push(trade);
        }
        trades.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.trade_id.cmp(&b.trade_id)));

        let cursor = match trades.last() {
            Some(t) => Some(Cursor::Sequence(t.timestamp as i64 + 1)),
            None => start,
        };

        debug!(count = trades.len(), ?cursor, "kraken trade history");
        Ok(TradeBatch { trades, cursor })
    }

    async fn get_open_orders(&self) -> Result<OpenOrdersByPair> {
        let result: KrakenOpenOrdersResult = self.api.post_private(OPEN_ORDERS_PATH, HashMap::new()).await?;

        let mut by_pair: OpenOrdersByPair = HashMap::new();
        for (txid, details) in &result.open {
            let order = self.parse_open_order(txid, details)?;
            by_pair.entry(order.pair).or_default().push(order);
        }
        for orders in by_pair.values_mut() {
            orders.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.order_id.0.cmp(&b.order_id.0)));
        }

        debug!(pairs = by_pair.len(), orders = result.open.len(), "kraken open orders");
        Ok(by_pair)
    }
}

#[async_trait::async_trait]
impl OrderEntry for KrakenExchange {
    async fn add_order(&self, order: &NewOrder) -> Result<TransactionId> {
        let symbol = self.venue_pair(&order.pair)?;

        if self.is_simulated {
            info!(
                pair = %order.pair,
                action = %order.action,
                price = %order.price,
                volume = %order.volume,
                "simulated add_order"
            );
            return Ok(TransactionId::new(TransactionId::SIMULATED));
        }

        let mut params = HashMap::new();
        params.insert("pair".to_string(), symbol);
        params.insert("type".to_string(), converters::to_kraken_side(order.action).to_string());
        params.insert("ordertype".to_string(), converters::to_kraken_order_type(order.order_type).to_string());
        params.insert("volume".to_string(), order.volume.as_string());
        if order.order_type.is_limit() {
            params.insert("price".to_string(), order.price.as_string());
        }

        let result: KrakenAddOrderResult = self.api.post_private(ADD_ORDER_PATH, params).await?;
        let txid = result
            .txid
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::parse("No order ID in response"))?;

        info!(%txid, pair = %order.pair, "kraken order placed");
        Ok(TransactionId::new(txid))
    }

    async fn cancel_order(&self, txid: &TransactionId) -> Result<CancelOrderResult> {
        if self.is_simulated {
            info!(%txid, "simulated cancel_order");
            return Ok(CancelOrderResult::Cancelled);
        }

        let mut params = HashMap::new();
        params.insert("txid".to_string(), txid.to_string());

        let result: KrakenCancelOrderResult = self.api.post_private(CANCEL_ORDER_PATH, params).await?;
        let outcome = if result.count > 0 {
            CancelOrderResult::Cancelled
        } else if result.pending {
            CancelOrderResult::Pending
        } else {
            CancelOrderResult::Failed
        };

        info!(%txid, ?outcome, "kraken cancel");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exchange() -> KrakenExchange {
        let api = KrakenRestClient::new_spot(None).unwrap();
        KrakenExchange::new(AssetConverter::kraken(), api, "", true)
    }

    fn xlm_btc() -> TradingPair {
        TradingPair::new(Asset::Xlm, Asset::Btc)
    }

    #[test]
    fn public_trade_row() {
        let row = vec![
            json!("0.00000210"),
            json!("1500.00000000"),
            json!(1616663618.4567),
            json!("b"),
            json!("l"),
            json!(""),
            json!(4242),
        ];
        let trade = exchange().parse_public_trade(&xlm_btc(), &row).unwrap();
        assert!(trade.action.is_buy());
        assert!(trade.order_type.is_limit());
        assert_eq!(trade.timestamp, 1_616_663_618_456);
        assert_eq!(trade.quote_volume.as_string(), "0.0031500000000000");
        assert_eq!(trade.trade_id.as_deref(), Some("4242"));
    }

    #[test]
    fn malformed_trade_row_is_rejected() {
        let row = vec![json!("0.1"), json!("1"), json!(1616663618.0), json!("x"), json!("l"), json!("")];
        assert!(exchange().parse_public_trade(&xlm_btc(), &row).is_err());

        let short = vec![json!("0.1")];
        assert!(exchange().parse_public_trade(&xlm_btc(), &short).is_err());
    }

    #[test]
    fn crossed_ticker_is_rejected() {
        let data = KrakenTickerData {
            a: vec!["1.0".into()],
            b: vec!["1.1".into()],
            c: vec!["1.05".into()],
        };
        assert!(exchange().parse_ticker(&xlm_btc(), &data).is_err());
    }

    #[test]
    fn zero_priced_ticker_is_rejected() {
        let data = KrakenTickerData {
            a: vec!["1.0".into()],
            b: vec!["0".into()],
            c: vec!["1.0".into()],
        };
        assert!(exchange().parse_ticker(&xlm_btc(), &data).is_err());
    }

    #[test]
    fn open_order_uses_alt_names_and_remaining() {
        let details: KrakenOrderDetails = serde_json::from_value(json!({
            "status": "open",
            "opentm": 1616666559.8974,
            "descr": { "pair": "XLMXBT", "type": "sell", "ordertype": "limit", "price": "0.00002500" },
            "vol": "100.00000000",
            "vol_exec": "60.00000000"
        }))
        .unwrap();
        let order = exchange().parse_open_order("OQCLML-BW3P3-BUCMWZ", &details).unwrap();
        assert_eq!(order.pair, xlm_btc());
        assert!(order.action.is_sell());
        assert_eq!(order.remaining.as_string(), "40.00000000");
        assert_eq!(order.timestamp, 1_616_666_559_897);
    }

    #[test]
    fn seconds_params() {
        assert_eq!(millis_to_seconds_param(1_616_663_618_456), "1616663618.456");
        assert_eq!(millis_to_seconds_param(1_000), "1.000");
        assert_eq!(millis_to_seconds_param(7), "0.007");
    }

    #[test]
    fn oversized_trade_price_is_a_parse_error() {
        let row = vec![
            json!("79228162514264337593543950335"),
            json!("2.0"),
            json!(1616663618.4567),
            json!("b"),
            json!("l"),
            json!(""),
            json!(1),
        ];
        let err = exchange().parse_public_trade(&xlm_btc(), &row).unwrap_err();
        assert!(matches!(err, ExchangeError::Parse(_)));
    }

    #[test]
    fn history_bounds_must_be_positive() {
        assert_eq!(history_bound(&Cursor::Sequence(1_616_667_769_640), "start").unwrap(), 1_616_667_769_640);
        assert!(history_bound(&Cursor::Sequence(0), "start").is_err());
        assert!(history_bound(&Cursor::Sequence(i64::MIN), "end").is_err());
    }

    #[test]
    fn token_cursors_are_not_kraken_cursors() {
        assert!(sequence_cursor(&Cursor::Token("abc".into())).is_err());
        assert_eq!(sequence_cursor(&Cursor::Sequence(5)).unwrap(), 5);
    }
}
