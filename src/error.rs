use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceWatchError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing field '{field}' in quote for {symbol}")]
    MissingField { symbol: String, field: &'static str },

    #[error("Unknown symbol {symbol}: {reason}")]
    UnknownSymbol { symbol: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notifier exited with {status}: {stderr}")]
    Notifier { status: String, stderr: String },
}

pub type Result<T> = std::result::Result<T, PriceWatchError>;
