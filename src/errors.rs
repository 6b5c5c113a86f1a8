use rust_decimal::Decimal;
use thiserror::Error;

/// Failures raised by the order book and the quote generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("Invalid order book entry: {field} must be positive, got {value}")]
    InvalidEntry { field: &'static str, value: String },

    #[error("Invalid amount: {0} (must be greater than zero)")]
    InvalidAmount(Decimal),

    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),

    #[error("Insufficient liquidity: requested {requested}, book can fill {available}")]
    InsufficientLiquidity {
        requested: Decimal,
        available: Decimal,
    },
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Invalid currency pair provided: {0}")]
    InvalidPair(String),

    #[error("Service unavailable (status {0})")]
    Unavailable(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected data from exchange: {0}")]
    UnexpectedData(String),
}

/// Everything that can stop a quote request after validation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid currency pair provided: {base}-{quote}")]
    UnknownPair { base: String, quote: String },

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Quote(#[from] QuoteError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
