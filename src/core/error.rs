use std::fmt;
use std::time::Duration;

use crate::core::constants::error_messages;

/// Comprehensive error types for urlexpander operations
#[derive(Debug)]
pub enum ExpanderError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// HTTP client error
    Http(reqwest::Error),

    /// Regex compilation error
    Regex(regex::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// JSON encoding/decoding error
    Json(serde_json::Error),

    /// File not found error
    FileNotFound(String),

    /// Invalid argument error
    InvalidArgument(String),

    /// Redirect probe failed (connection failure, bad response)
    Probe(String),

    /// Page navigation failed
    Navigation(String),

    /// Page navigation did not settle before its deadline
    NavigationTimeout(Duration),

    /// The navigator pool was shut down
    PoolClosed,

    /// Reading or writing a processed file failed
    File {
        path: String,
        source: std::io::Error,
    },
}

impl fmt::Display for ExpanderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpanderError::Io(err) => write!(f, "IO error: {err}"),
            ExpanderError::Config(msg) => write!(f, "Configuration error: {msg}"),
            ExpanderError::Http(err) => write!(f, "HTTP error: {err}"),
            ExpanderError::Regex(err) => write!(f, "Regex error: {err}"),
            ExpanderError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            ExpanderError::Json(err) => write!(f, "JSON error: {err}"),
            ExpanderError::FileNotFound(path) => write!(f, "File not found: {path}"),
            ExpanderError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            ExpanderError::Probe(msg) => write!(f, "Probe error: {msg}"),
            ExpanderError::Navigation(msg) => write!(f, "Navigation error: {msg}"),
            ExpanderError::NavigationTimeout(timeout) => write!(
                f,
                "Navigation error: {} after {}ms",
                error_messages::NAVIGATION_TIMED_OUT,
                timeout.as_millis()
            ),
            ExpanderError::PoolClosed => {
                write!(f, "Navigation error: {}", error_messages::POOL_CLOSED)
            }
            ExpanderError::File { path, source } => write!(f, "File error: {path}: {source}"),
        }
    }
}

impl std::error::Error for ExpanderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExpanderError::Io(err) => Some(err),
            ExpanderError::Http(err) => Some(err),
            ExpanderError::Regex(err) => Some(err),
            ExpanderError::TomlParsing(err) => Some(err),
            ExpanderError::Json(err) => Some(err),
            ExpanderError::File { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ExpanderError {
    /// Wrap an IO error with the path it happened on.
    pub fn file<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        ExpanderError::File {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Whether this error came out of the navigation tier.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ExpanderError::Navigation(_)
                | ExpanderError::NavigationTimeout(_)
                | ExpanderError::PoolClosed
        )
    }
}

impl From<std::io::Error> for ExpanderError {
    fn from(err: std::io::Error) -> Self {
        ExpanderError::Io(err)
    }
}

impl From<reqwest::Error> for ExpanderError {
    fn from(err: reqwest::Error) -> Self {
        ExpanderError::Http(err)
    }
}

impl From<regex::Error> for ExpanderError {
    fn from(err: regex::Error) -> Self {
        ExpanderError::Regex(err)
    }
}

impl From<toml::de::Error> for ExpanderError {
    fn from(err: toml::de::Error) -> Self {
        ExpanderError::TomlParsing(err)
    }
}

impl From<serde_json::Error> for ExpanderError {
    fn from(err: serde_json::Error) -> Self {
        ExpanderError::Json(err)
    }
}

/// Type alias for Results using ExpanderError
pub type Result<T> = std::result::Result<T, ExpanderError>;
