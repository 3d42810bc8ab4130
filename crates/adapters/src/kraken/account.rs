use crate::config::KrakenConfig;
use crate::error::{ExchangeError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

// ============================================================================
// API Endpoint Constants
// ============================================================================

pub const TICKER_PATH: &str = "/0/public/Ticker";
pub const DEPTH_PATH: &str = "/0/public/Depth";
pub const TRADES_PATH: &str = "/0/public/Trades";
pub const BALANCE_PATH: &str = "/0/private/Balance";
pub const TRADES_HISTORY_PATH: &str = "/0/private/TradesHistory";
pub const OPEN_ORDERS_PATH: &str = "/0/private/OpenOrders";
pub const ADD_ORDER_PATH: &str = "/0/private/AddOrder";
pub const CANCEL_ORDER_PATH: &str = "/0/private/CancelOrder";

// ============================================================================
// Authentication
// ============================================================================

/// Kraken API authentication credentials
///
/// The secret is base64-encoded as issued by Kraken and is decoded only when
/// signing. Keep both values out of version control.
#[derive(Clone)]
pub struct KrakenAuth {
    /// API key string (public identifier)
    pub api_key: String,

    /// API secret in base64-encoded format (private signing key)
    pub api_secret: String,
}

impl std::fmt::Debug for KrakenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenAuth")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl KrakenAuth {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self { api_key, api_secret }
    }

    /// Credentials, or `None` when either half is empty
    pub fn from_parts(api_key: &str, api_secret: &str) -> Option<Self> {
        if api_key.is_empty() || api_secret.is_empty() {
            None
        } else {
            Some(Self::new(api_key.to_string(), api_secret.to_string()))
        }
    }

    /// Generates HMAC-SHA512 signature for Kraken REST API authenticated requests
    ///
    /// Kraken's authentication scheme requires:
    /// 1. SHA256 hash of (nonce + postdata)
    /// 2. Concatenate API path + SHA256 hash
    /// 3. HMAC-SHA512 of the concatenated message using decoded API secret
    /// 4. Base64 encode the signature
    ///
    /// The result goes in the `API-Sign` header next to `API-Key`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the API secret is not valid base64.
    pub fn sign_request(&self, path: &str, nonce: u64, postdata: &str) -> Result<String> {
        use base64::engine::general_purpose;
        use base64::Engine;
        use hmac::{Hmac, Mac};
        use sha2::{Digest, Sha256, Sha512};

        let decoded_secret = general_purpose::STANDARD
            .decode(&self.api_secret)
            .map_err(|e| ExchangeError::Config(format!("Failed to decode API secret: {}", e)))?;

        let mut sha256 = Sha256::new();
        sha256.update(format!("{}{}", nonce, postdata));
        let sha256_result = sha256.finalize();

        let mut message = path.as_bytes().to_vec();
        message.extend_from_slice(&sha256_result);

        let mut mac = Hmac::<Sha512>::new_from_slice(&decoded_secret)
            .map_err(|e| ExchangeError::Config(format!("Failed to create HMAC: {}", e)))?;
        mac.update(&message);
        let signature = mac.finalize().into_bytes();

        Ok(general_purpose::STANDARD.encode(signature))
    }
}

/// Strictly increasing millisecond nonce shared by every clone of a client
#[derive(Debug, Default)]
struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper for Kraken REST API
///
/// Cheap to clone: `reqwest::Client` pools connections behind an `Arc`, and
/// clones share one nonce source so concurrent private calls never reuse a
/// nonce.
#[derive(Clone, Debug)]
pub struct KrakenRestClient {
    client: Client,
    auth: Option<KrakenAuth>,
    base_url: String,
    nonce: Arc<NonceSource>,
}

impl KrakenRestClient {
    fn build_client(timeout: Duration, connect_timeout: Duration) -> Result<Client> {
        Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ExchangeError::Config(format!("Failed to build HTTP client: {}", e)))
    }

    /// Client for the production Spot REST API with default timeouts
    ///
    /// Pass `None` for public-only access.
    pub fn new_spot(auth: Option<KrakenAuth>) -> Result<Self> {
        Self::from_config(&KrakenConfig::default()).map(|c| c.with_auth(auth))
    }

    pub fn from_config(config: &KrakenConfig) -> Result<Self> {
        let client = Self::build_client(
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
        )?;
        Ok(Self {
            client,
            auth: KrakenAuth::from_parts(&config.api_key, &config.api_secret),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            nonce: Arc::new(NonceSource::default()),
        })
    }

    pub fn with_auth(mut self, auth: Option<KrakenAuth>) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    /// Makes an unauthenticated GET request to a public endpoint
    ///
    /// # Errors
    ///
    /// `Network` on transport failure, `VenueReject` for HTTP or Kraken errors,
    /// `Parse` when the body does not match `T`.
    pub async fn get_public<T: for<'de> serde::Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: Option<HashMap<String, String>>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.client.get(&url);

        if let Some(params) = &params {
            request = request.query(params);
        }

        debug!(endpoint, ?params, "kraken public request");

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode_envelope(endpoint, status, &body)
    }

    /// Makes an authenticated POST request to a private endpoint
    ///
    /// # Authentication Flow
    ///
    /// 1. Takes the next nonce
    /// 2. URL-encodes the parameters plus nonce into the POST body
    /// 3. Signs path + body with the API secret
    /// 4. Sends `API-Key` and `API-Sign` headers
    ///
    /// # Errors
    ///
    /// `Unauthenticated` before any I/O when the client has no credentials;
    /// otherwise as [`get_public`](Self::get_public).
    pub async fn post_private<T: for<'de> serde::Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: HashMap<String, String>,
    ) -> Result<T> {
        let auth = self.auth.as_ref().ok_or(ExchangeError::Unauthenticated)?;

        let nonce = self.nonce.next();
        let mut all_params = params;
        all_params.insert("nonce".to_string(), nonce.to_string());

        let postdata = serde_urlencoded::to_string(&all_params)
            .map_err(|e| ExchangeError::parse(format!("Failed to encode request: {}", e)))?;
        let signature = auth.sign_request(endpoint, nonce, &postdata)?;

        debug!(endpoint, nonce, "kraken private request");

        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header("API-Key", &auth.api_key)
            .header("API-Sign", signature)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(postdata)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        decode_envelope(endpoint, status, &body)
    }
}

fn decode_envelope<T: for<'de> serde::Deserialize<'de>>(
    endpoint: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> Result<T> {
    if !status.is_success() {
        warn!(endpoint, %status, "kraken http failure");
        // Kraken sometimes wraps its own error list in a non-2xx response
        if let Ok(envelope) = serde_json::from_str::<KrakenResponse<serde_json::Value>>(body) {
            if let Some(err) = envelope.venue_error() {
                return Err(err);
            }
        }
        return Err(ExchangeError::VenueReject {
            code: format!("HTTP {}", status.as_u16()),
            message: body.chars().take(512).collect(),
        });
    }

    let envelope: KrakenResponse<T> = serde_json::from_str(body)?;
    envelope.into_result().inspect_err(|e| warn!(endpoint, error = %e, "kraken rejected request"))
}

// ============================================================================
// Response Types
// ============================================================================

/// Standard Kraken API response envelope
///
/// Success response:
/// ```json
/// { "error": [], "result": { "XXBTZUSD": { "a": ["50000.00", ...], ... } } }
/// ```
///
/// Error response:
/// ```json
/// { "error": ["EOrder:Insufficient funds"] }
/// ```
#[derive(Debug, serde::Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,

    pub result: Option<T>,
}

impl<T> KrakenResponse<T> {
    /// Extracts the result, or the first venue error as `VenueReject`
    ///
    /// Kraken errors look like `"EQuery:Unknown asset pair"`; the part before the
    /// first colon becomes the code. Any further errors are appended to the message.
    pub fn into_result(self) -> Result<T> {
        if let Some(err) = self.venue_error() {
            return Err(err);
        }
        self.result
            .ok_or_else(|| ExchangeError::parse("Missing result in API response"))
    }

    pub fn venue_error(&self) -> Option<ExchangeError> {
        let (first, rest) = self.error.split_first()?;
        let (code, message) = match first.split_once(':') {
            Some((code, message)) => (code.to_string(), message.to_string()),
            None => (first.clone(), first.clone()),
        };
        let message = if rest.is_empty() {
            message
        } else {
            format!("{}; {}", message, rest.join("; "))
        };
        Some(ExchangeError::VenueReject { code, message })
    }
}

// ============================================================================
// Type Converters
// ============================================================================

/// Conversions between Kraken's string enums and the contract's types
///
/// Unknown strings are `Parse` errors rather than fallbacks.
pub mod converters {
    use crate::error::{ExchangeError, Result};
    use crate::traits::{OrderAction, OrderType};

    pub fn to_kraken_order_type(order_type: OrderType) -> &'static str {
        match order_type {
            OrderType::Limit => "limit",
            OrderType::Market => "market",
        }
    }

    pub fn from_kraken_order_type(order_type: &str) -> Result<OrderType> {
        match order_type {
            "limit" | "l" => Ok(OrderType::Limit),
            "market" | "m" => Ok(OrderType::Market),
            other => Err(ExchangeError::parse(format!("unknown order type {:?}", other))),
        }
    }

    pub fn to_kraken_side(action: OrderAction) -> &'static str {
        match action {
            OrderAction::Buy => "buy",
            OrderAction::Sell => "sell",
        }
    }

    /// Accepts the long form (`buy`) and the trade-feed short form (`b`)
    pub fn from_kraken_side(side: &str) -> Result<OrderAction> {
        match side.to_lowercase().as_str() {
            "buy" | "b" => Ok(OrderAction::Buy),
            "sell" | "s" => Ok(OrderAction::Sell),
            other => Err(ExchangeError::parse(format!("unknown side {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::traits::{OrderAction, OrderType};

    #[test]
    fn signature_matches_kraken_reference() {
        let auth = KrakenAuth::new(
            "key".to_string(),
            "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==".to_string(),
        );
        let postdata = "nonce=1616492376594&ordertype=limit&pair=XBTUSD&price=37500&type=buy&volume=1.25";
        let sig = auth.sign_request("/0/private/AddOrder", 1616492376594, postdata).unwrap();
        assert_eq!(
            sig,
            "4/dpxb3iT4tp/ZCVEwSnEsLxx0bqyhLpdfOpc6fn7OR8+UClSV5n9E6aSS8MPtnRfp32bAb0nmbRn6H8ndwLUQ=="
        );
    }

    #[test]
    fn bad_secret_is_a_config_error() {
        let auth = KrakenAuth::new("key".to_string(), "not base64!".to_string());
        let err = auth.sign_request("/0/private/Balance", 1, "nonce=1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn empty_credentials_mean_public_only() {
        assert!(KrakenAuth::from_parts("", "").is_none());
        assert!(KrakenAuth::from_parts("key", "").is_none());
        assert!(KrakenAuth::from_parts("key", "c2VjcmV0").is_some());
    }

    #[test]
    fn nonces_strictly_increase() {
        let source = NonceSource::default();
        let mut last = 0;
        for _ in 0..1000 {
            let n = source.next();
            assert!(n > last);
            last = n;
        }
    }

    #[test]
    fn envelope_errors_become_venue_rejects() {
        let envelope: KrakenResponse<serde_json::Value> =
            serde_json::from_str(r#"{"error":["EQuery:Unknown asset pair","EGeneral:Invalid arguments"]}"#).unwrap();
        match envelope.into_result().unwrap_err() {
            ExchangeError::VenueReject { code, message } => {
                assert_eq!(code, "EQuery");
                assert_eq!(message, "Unknown asset pair; EGeneral:Invalid arguments");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn envelope_without_result_is_a_parse_error() {
        let envelope: KrakenResponse<serde_json::Value> = serde_json::from_str(r#"{"error":[]}"#).unwrap();
        assert_eq!(envelope.into_result().unwrap_err().kind(), ErrorKind::Parse);
    }

    #[test]
    fn non_success_status_is_a_venue_reject() {
        let err = decode_envelope::<serde_json::Value>("/0/public/Ticker", reqwest::StatusCode::BAD_GATEWAY, "<html>")
            .unwrap_err();
        match err {
            ExchangeError::VenueReject { code, .. } => assert_eq!(code, "HTTP 502"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = decode_envelope::<serde_json::Value>(
            "/0/private/Balance",
            reqwest::StatusCode::FORBIDDEN,
            r#"{"error":["EAPI:Invalid key"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ExchangeError::VenueReject { ref code, .. } if code == "EAPI"));
    }

    #[test]
    fn converters_reject_unknown_values() {
        assert_eq!(converters::from_kraken_side("b").unwrap(), OrderAction::Buy);
        assert_eq!(converters::from_kraken_side("Sell").unwrap(), OrderAction::Sell);
        assert!(converters::from_kraken_side("hold").is_err());
        assert_eq!(converters::from_kraken_order_type("l").unwrap(), OrderType::Limit);
        assert!(converters::from_kraken_order_type("stop-loss").is_err());
        assert_eq!(converters::to_kraken_order_type(OrderType::Market), "market");
    }
}
