//! Error types for the AIS client

/// Result type alias for AIS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the speaker or a content provider
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection refused, DNS failure, broken transfer...
    #[error("Network error: {0}")]
    Network(String),

    /// The call did not complete within its timeout
    #[error("Request timeout")]
    Timeout,

    /// The endpoint answered with something other than 200
    #[error("HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    /// Body does not have the expected text/structured shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The identifier does not map to any provider endpoint
    #[error("Unknown provider for media content id: {0}")]
    UnknownProvider(String),

    /// The identifier names a provider but lacks the part the call needs
    #[error("Malformed media content id: {0}")]
    MalformedContentId(String),
}

impl Error {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, url: impl Into<String>) -> Self {
        Self::Http {
            status,
            url: url.into(),
        }
    }

    /// Timeout, DNS or connection failure
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }

    /// Non-200 answer
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Body could not be read in the expected shape
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Json(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
