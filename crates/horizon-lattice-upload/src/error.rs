//! Error types for the transports.

/// Everything that can go wrong sending a GraphQL request.
///
/// Failures are reported once and never retried.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    /// The request could not be sent or its response read.
    #[error("HTTP request error: {0}")]
    Request(String),

    /// The endpoint is not an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request or connect timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// No connection could be made.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A header name or value is not valid HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Variables could not be encoded or a body could not be decoded.
    #[error("JSON error: {0}")]
    Json(String),

    /// A file to upload could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// The response body is not a usable GraphQL response.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}{}", status_detail(.message))]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Response body, if there was one.
        message: Option<String>,
    },

    /// The redirect limit was reached.
    #[error("Too many redirects")]
    TooManyRedirects,

    /// The proxy URL was rejected.
    #[error("Proxy error: {0}")]
    Proxy(String),

    /// A file descriptor points somewhere that cannot be read locally.
    #[error("Unsupported file URI: {0}")]
    UnsupportedUri(String),
}

fn status_detail(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        match () {
            _ if err.is_timeout() => Self::Timeout,
            _ if err.is_connect() => Self::Connection(err.to_string()),
            _ if err.is_redirect() => Self::TooManyRedirects,
            _ if err.is_builder() => Self::InvalidUrl(err.to_string()),
            _ => Self::Request(err.to_string()),
        }
    }
}

macro_rules! convert {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for NetworkError {
                fn from(err: $source) -> Self {
                    Self::$variant(err.to_string())
                }
            }
        )*
    };
}

convert! {
    url::ParseError => InvalidUrl,
    serde_json::Error => Json,
    std::io::Error => Io,
    http::header::InvalidHeaderName => InvalidHeader,
    http::header::InvalidHeaderValue => InvalidHeader,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;
