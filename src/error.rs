//! Error types for table construction and remote loading.

/// Errors produced while building a table or loading remote pages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No view matched the selector the table was mounted on.
    #[error("No element found for table: {0}")]
    ElementNotFound(String),

    /// The mounted view is not a table.
    #[error("Only table elements can be mounted (got {0})")]
    NotATable(String),

    /// Remote mode was requested without a column mapping.
    #[error("\"columns\" must be defined in AJAX mode")]
    MissingColumns,

    /// Remote mode was requested without an endpoint.
    #[error("\"url\" must be defined in AJAX mode")]
    MissingUrl,

    /// An option object could not be read.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The endpoint URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// Message extracted from the response body, if any.
        message: String,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON shape.
    #[error("Response parse error: {message}")]
    Decode {
        /// Description of the parse failure.
        message: String,
        /// Raw response body.
        body: String,
    },
}

impl Error {
    /// Creates a new HTTP error.
    pub fn http(status: u16, status_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
            message: message.into(),
        }
    }

    /// Creates a new decode error with the raw response body.
    pub fn decode(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Returns the HTTP status code, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message handed to error handlers.
    pub fn message(&self) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            Self::Decode { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Status text handed to error handlers.
    pub fn status_text(&self) -> String {
        match self {
            Self::Http { status_text, .. } => status_text.clone(),
            Self::Transport(_) => "Network Error".to_string(),
            Self::Decode { .. } => "Malformed Response".to_string(),
            _ => String::new(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
