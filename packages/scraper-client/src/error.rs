use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScraperError>;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Keyword must not be empty")]
    EmptyKeyword,
}

impl ScraperError {
    /// True when the service answered 404, e.g. for an unknown keyword.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScraperError::Api { status: 404, .. })
    }
}

impl From<reqwest::Error> for ScraperError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ScraperError::Parse(err.to_string())
        } else {
            ScraperError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ScraperError {
    fn from(err: serde_json::Error) -> Self {
        ScraperError::Parse(err.to_string())
    }
}
