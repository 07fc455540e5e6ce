//! Error types for the application

use thiserror::Error;

/// Result type alias using our ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Main error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Request rejected by the exchange
    #[error("API error {code}: {msg}")]
    Api { code: i64, msg: String },

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File system errors while reading keys or config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Account name not present in the key file
    #[error("account {0} not found")]
    AccountNotFound(String),

    /// Symbol not listed by the exchange
    #[error("symbol {0} not found")]
    SymbolNotFound(String),

    /// No balance entry for the asset needed to size an order
    #[error("balance {0} not found")]
    BalanceNotFound(String),

    /// Symbol carries no LOT_SIZE filter
    #[error("symbol {0} has no lot size filter")]
    NoLotSizeFilter(String),

    /// Malformed quantity, percentage or price
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Command arguments that cannot be acted on
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure while reducing per-account results
    #[error("aggregation failed: {0}")]
    Reducer(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Whether the error came from talking to the exchange
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::HttpRequest(_)
                | ClientError::JsonParse(_)
                | ClientError::Api { .. }
                | ClientError::InvalidResponse(_)
                | ClientError::Timeout(_)
                | ClientError::Authentication(_)
        )
    }
}
