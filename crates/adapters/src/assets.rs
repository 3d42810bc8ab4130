//! Canonical assets, trading pairs and venue code conversion

use crate::error::{ExchangeError, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Asset & TradingPair
// ============================================================================

/// Canonical asset identifier used throughout the bot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    Usd,
    Eur,
    Xlm,
    Btc,
    Ltc,
    Eth,
    Rep,
    Xrp,
}

impl Asset {
    pub const ALL: [Asset; 8] = [
        Asset::Usd,
        Asset::Eur,
        Asset::Xlm,
        Asset::Btc,
        Asset::Ltc,
        Asset::Eth,
        Asset::Rep,
        Asset::Xrp,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Asset::Usd => "USD",
            Asset::Eur => "EUR",
            Asset::Xlm => "XLM",
            Asset::Btc => "BTC",
            Asset::Ltc => "LTC",
            Asset::Eth => "ETH",
            Asset::Rep => "REP",
            Asset::Xrp => "XRP",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Asset {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        Asset::ALL
            .iter()
            .copied()
            .find(|a| a.code() == upper)
            .ok_or_else(|| ExchangeError::UnsupportedAsset(s.to_string()))
    }
}

/// Ordered (base, quote) pair; prices are quoted in `quote` per one `base`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradingPair {
    pub base: Asset,
    pub quote: Asset,
}

impl TradingPair {
    pub fn new(base: Asset, quote: Asset) -> Self {
        Self { base, quote }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for TradingPair {
    type Err = ExchangeError;

    /// Parses `BASE/QUOTE`
    fn from_str(s: &str) -> Result<Self> {
        let (base, quote) = s
            .split_once('/')
            .ok_or_else(|| ExchangeError::UnsupportedAsset(format!("not a BASE/QUOTE pair: {}", s)))?;
        Ok(Self::new(base.parse()?, quote.parse()?))
    }
}

// ============================================================================
// Asset Converter
// ============================================================================

/// Bidirectional table between canonical assets and venue codes
///
/// Construction checks the table is a bijection. Lookups are hash-map backed
/// and the converter is immutable, so one instance can be shared by any number
/// of concurrent callers.
#[derive(Clone, Debug)]
pub struct AssetConverter {
    to_venue: HashMap<Asset, String>,
    from_venue: HashMap<String, Asset>,
}

impl AssetConverter {
    pub fn new<I, S>(table: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Asset, S)>,
        S: Into<String>,
    {
        let mut to_venue = HashMap::new();
        let mut from_venue = HashMap::new();

        for (asset, code) in table {
            let code = code.into();
            if code.is_empty() {
                return Err(ExchangeError::Config(format!("empty venue code for {}", asset)));
            }
            if to_venue.insert(asset, code.clone()).is_some() {
                return Err(ExchangeError::Config(format!("asset {} mapped twice", asset)));
            }
            if from_venue.insert(code.clone(), asset).is_some() {
                return Err(ExchangeError::Config(format!("venue code {} mapped twice", code)));
            }
        }

        Ok(Self { to_venue, from_venue })
    }

    /// Kraken's asset codes as used by Balance, Ticker, Depth and Trades
    pub fn kraken() -> Self {
        Self::from_static(&[
            (Asset::Usd, "ZUSD"),
            (Asset::Eur, "ZEUR"),
            (Asset::Xlm, "XXLM"),
            (Asset::Btc, "XXBT"),
            (Asset::Ltc, "XLTC"),
            (Asset::Eth, "XETH"),
            (Asset::Rep, "XREP"),
            (Asset::Xrp, "XXRP"),
        ])
    }

    /// Kraken's short alt names, used in open-order descriptions (`XLMXBT`)
    pub fn kraken_alt_names() -> Self {
        Self::from_static(&[
            (Asset::Usd, "USD"),
            (Asset::Eur, "EUR"),
            (Asset::Xlm, "XLM"),
            (Asset::Btc, "XBT"),
            (Asset::Ltc, "LTC"),
            (Asset::Eth, "ETH"),
            (Asset::Rep, "REP"),
            (Asset::Xrp, "XRP"),
        ])
    }

    fn from_static(table: &[(Asset, &str)]) -> Self {
        let to_venue = table.iter().map(|(a, c)| (*a, c.to_string())).collect();
        let from_venue = table.iter().map(|(a, c)| (c.to_string(), *a)).collect();
        Self { to_venue, from_venue }
    }

    pub fn to_venue(&self, asset: Asset) -> Result<&str> {
        self.to_venue
            .get(&asset)
            .map(String::as_str)
            .ok_or_else(|| ExchangeError::UnsupportedAsset(asset.to_string()))
    }

    pub fn from_venue(&self, code: &str) -> Result<Asset> {
        self.from_venue
            .get(code)
            .copied()
            .ok_or_else(|| ExchangeError::UnsupportedAsset(code.to_string()))
    }

    /// Assets this converter can translate
    pub fn assets(&self) -> impl Iterator<Item = Asset> + '_ {
        self.to_venue.keys().copied()
    }

    /// Venue codes this converter can translate
    pub fn venue_codes(&self) -> impl Iterator<Item = &str> + '_ {
        self.from_venue.keys().map(String::as_str)
    }

    /// `to_venue(base) + delimiter + to_venue(quote)`
    pub fn pair_to_venue(&self, pair: &TradingPair, delimiter: &str) -> Result<String> {
        Ok(format!(
            "{}{}{}",
            self.to_venue(pair.base)?,
            delimiter,
            self.to_venue(pair.quote)?
        ))
    }

    /// Inverse of [`pair_to_venue`](Self::pair_to_venue)
    ///
    /// With an empty delimiter the symbol must split at exactly one point into
    /// two known codes; anything else is reported as unsupported.
    pub fn pair_from_venue(&self, symbol: &str, delimiter: &str) -> Result<TradingPair> {
        if !delimiter.is_empty() {
            let (base, quote) = symbol.split_once(delimiter).ok_or_else(|| {
                ExchangeError::UnsupportedAsset(format!("pair {} has no delimiter {:?}", symbol, delimiter))
            })?;
            return Ok(TradingPair::new(self.from_venue(base)?, self.from_venue(quote)?));
        }

        let mut found = None;
        for (i, _) in symbol.char_indices().skip(1) {
            let (base, quote) = symbol.split_at(i);
            if let (Some(b), Some(q)) = (self.from_venue.get(base), self.from_venue.get(quote)) {
                if found.is_some() {
                    return Err(ExchangeError::UnsupportedAsset(format!("ambiguous pair {}", symbol)));
                }
                found = Some(TradingPair::new(*b, *q));
            }
        }

        found.ok_or_else(|| ExchangeError::UnsupportedAsset(format!("pair {}", symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn kraken_table_round_trips() {
        for converter in [AssetConverter::kraken(), AssetConverter::kraken_alt_names()] {
            for asset in converter.assets() {
                let code = converter.to_venue(asset).unwrap();
                assert_eq!(converter.from_venue(code).unwrap(), asset);
            }
            for code in converter.venue_codes() {
                let asset = converter.from_venue(code).unwrap();
                assert_eq!(converter.to_venue(asset).unwrap(), code);
            }
        }
    }

    #[test]
    fn kraken_wire_codes() {
        let c = AssetConverter::kraken();
        assert_eq!(c.to_venue(Asset::Usd).unwrap(), "ZUSD");
        assert_eq!(c.to_venue(Asset::Xlm).unwrap(), "XXLM");
        assert_eq!(c.to_venue(Asset::Btc).unwrap(), "XXBT");
        assert_eq!(c.to_venue(Asset::Ltc).unwrap(), "XLTC");
        assert_eq!(c.to_venue(Asset::Eth).unwrap(), "XETH");
        assert_eq!(c.to_venue(Asset::Rep).unwrap(), "XREP");
    }

    #[test]
    fn rejects_non_bijective_tables() {
        let dup_code = AssetConverter::new([(Asset::Btc, "XBT"), (Asset::Eth, "XBT")]);
        assert_eq!(dup_code.unwrap_err().kind(), ErrorKind::Config);

        let dup_asset = AssetConverter::new([(Asset::Btc, "XBT"), (Asset::Btc, "BTC")]);
        assert_eq!(dup_asset.unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn unknown_codes_are_errors() {
        let c = AssetConverter::new([(Asset::Btc, "XXBT")]).unwrap();
        assert_eq!(c.to_venue(Asset::Xlm).unwrap_err().kind(), ErrorKind::UnsupportedAsset);
        assert_eq!(c.from_venue("XXDG").unwrap_err().kind(), ErrorKind::UnsupportedAsset);
    }

    #[test]
    fn pair_symbols() {
        let c = AssetConverter::kraken();
        let pair = TradingPair::new(Asset::Xlm, Asset::Btc);
        assert_eq!(c.pair_to_venue(&pair, "").unwrap(), "XXLMXXBT");
        assert_eq!(c.pair_from_venue("XXLMXXBT", "").unwrap(), pair);
        assert_eq!(c.pair_to_venue(&pair, "-").unwrap(), "XXLM-XXBT");
        assert_eq!(c.pair_from_venue("XXLM-XXBT", "-").unwrap(), pair);

        let alt = AssetConverter::kraken_alt_names();
        assert_eq!(alt.pair_from_venue("XLMXBT", "").unwrap(), pair);
        assert_eq!(
            alt.pair_from_venue("XBTUSD", "").unwrap(),
            TradingPair::new(Asset::Btc, Asset::Usd)
        );
        assert!(alt.pair_from_venue("DOGEUSD", "").is_err());
    }

    #[test]
    fn ambiguous_split_is_rejected() {
        let c = AssetConverter::new([(Asset::Btc, "A"), (Asset::Eth, "AA"), (Asset::Usd, "AAA")]).unwrap();
        // "AAAA" splits as A|AAA and AA|AA and AAA|A
        assert!(c.pair_from_venue("AAAA", "").is_err());
    }

    #[test]
    fn parses_canonical_names() {
        assert_eq!("xlm".parse::<Asset>().unwrap(), Asset::Xlm);
        let pair: TradingPair = "XLM/BTC".parse().unwrap();
        assert_eq!(pair.to_string(), "XLM/BTC");
        assert!("XLMBTC".parse::<TradingPair>().is_err());
    }
}
