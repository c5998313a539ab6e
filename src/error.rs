//! Error types for card_arbitrage

use std::fmt;

/// Unified error type for analysis operations.
///
/// Note that an unreachable price source is *not* an error at the pipeline
/// level: source clients recover locally to "zero candidates" and the
/// fallback runner moves on. These variants cover the failures that must
/// surface to the caller (classifier problems, startup configuration) and
/// the transport/parse errors the clients translate before recovering.
#[derive(Debug)]
pub enum AnalyzeError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// Failed to parse a JSON response
    Parse(serde_json::Error),
    /// HTTP error status code
    HttpStatus(reqwest::StatusCode),
    /// The image classifier errored or returned unusable data
    Classifier(String),
    /// A required credential or setting is absent at startup
    MissingConfig(&'static str),
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeError::Network(e) => write!(f, "Network error: {}", e),
            AnalyzeError::Parse(e) => write!(f, "Parse error: {}", e),
            AnalyzeError::HttpStatus(status) => write!(f, "HTTP error: {}", status),
            AnalyzeError::Classifier(msg) => write!(f, "Card identification failed: {}", msg),
            AnalyzeError::MissingConfig(name) => {
                write!(f, "Missing required configuration: {}", name)
            }
        }
    }
}

impl std::error::Error for AnalyzeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyzeError::Network(e) => Some(e),
            AnalyzeError::Parse(e) => Some(e),
            AnalyzeError::HttpStatus(_) => None,
            AnalyzeError::Classifier(_) => None,
            AnalyzeError::MissingConfig(_) => None,
        }
    }
}

impl From<reqwest::Error> for AnalyzeError {
    fn from(err: reqwest::Error) -> Self {
        AnalyzeError::Network(err)
    }
}

impl From<serde_json::Error> for AnalyzeError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzeError::Parse(err)
    }
}

/// Result alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalyzeError>;
