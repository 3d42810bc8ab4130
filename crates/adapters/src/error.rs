//! Error types shared by every exchange adapter

use std::time::Duration;

/// Broad category of an [`ExchangeError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedAsset,
    Network,
    VenueReject,
    Parse,
    Unauthenticated,
    Config,
}

/// Error types for exchange operations
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("Venue rejected request ({code}): {message}")]
    VenueReject { code: String, message: String },

    #[error("Malformed venue response: {0}")]
    Parse(String),

    #[error("Authentication required for private endpoints")]
    Unauthenticated,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

impl ExchangeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::UnsupportedAsset(_) => ErrorKind::UnsupportedAsset,
            ExchangeError::Network(_) | ExchangeError::DeadlineExceeded(_) => ErrorKind::Network,
            ExchangeError::VenueReject { .. } => ErrorKind::VenueReject,
            ExchangeError::Parse(_) => ErrorKind::Parse,
            ExchangeError::Unauthenticated => ErrorKind::Unauthenticated,
            ExchangeError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        ExchangeError::Parse(msg.into())
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExchangeError::Network(format!("request timed out: {}", e))
        } else {
            ExchangeError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(e: serde_json::Error) -> Self {
        ExchangeError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_is_a_network_failure() {
        let err = ExchangeError::DeadlineExceeded(Duration::from_millis(250));
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn venue_reject_keeps_code_and_message() {
        let err = ExchangeError::VenueReject {
            code: "EQuery".to_string(),
            message: "Unknown asset pair".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::VenueReject);
        assert_eq!(err.to_string(), "Venue rejected request (EQuery): Unknown asset pair");
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: ExchangeError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
