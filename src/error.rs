/// Result type alias for client operations
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client-side validation failure. Raised before any network call.
    #[error("{0}")]
    Validation(String),

    /// The anonymous scan allowance is exhausted. Raised before any network call.
    #[error("anonymous scan limit reached, sign in to continue")]
    QuotaExceeded { remaining: u32 },

    /// Network failure or non-2xx status. The message is the backend-provided
    /// text verbatim when present; UI layers render it as-is.
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// 2xx response whose body is missing required fields or carries values
    /// outside the backend contract.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Bad client configuration (unusable base URL, out-of-range timeout).
    /// Distinct from `Validation`, which is reserved for user-input
    /// short-circuits like a missing file or an empty note.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new transport error carrying the backend message verbatim
    pub fn transport<T: Into<String>>(status: Option<u16>, msg: T) -> Self {
        Self::Transport {
            status,
            message: msg.into(),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<T: Into<String>>(msg: T) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn quota_exceeded(remaining: u32) -> Self {
        Self::QuotaExceeded { remaining }
    }

    /// True for the two local short-circuit kinds that never reach the network.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::QuotaExceeded { .. })
    }
}
