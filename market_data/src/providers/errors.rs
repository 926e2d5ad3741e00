use thiserror::Error;

/// Errors that can occur within a `BarProvider` implementation.
///
/// Callers are expected to treat every variant the same way for control flow
/// (the ticker is skipped); the distinctions exist for diagnostics only.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider's API returned a specific error message.
    #[error("API error: {0}")]
    Api(String),

    /// The provider returned no usable bars for the symbol.
    #[error("no bars returned for {symbol}")]
    Empty {
        /// The symbol the request was for.
        symbol: String,
    },

    /// The response payload did not have the expected shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}
