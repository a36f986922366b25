//! Error types for ytsub-dl
//!
//! This module provides the error taxonomy for the crate:
//! - A top-level [`Error`] used by every operation
//! - Domain-specific sub-errors for channel resolution, item retrieval and feeds
//! - Machine-readable error codes for structured log fields

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ytsub-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ytsub-dl
///
/// Each variant includes enough context to tell which channel, URL or file the
/// failure belongs to.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "days_back")
        key: Option<String>,
    },

    /// The subscription file exists but could not be parsed
    #[error("failed to parse {path}: {reason}")]
    Parse {
        /// Path of the file that failed to parse
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel metadata probe failed
    #[error("channel resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Retrieval of a single item failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Fetching or parsing a channel feed failed
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// A filter or ignore pattern is not a valid regular expression
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern as written in the subscription
        pattern: String,
        /// Regex compiler message
        reason: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External tool execution failed (spawn failure, unexpected exit)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Channel resolution errors
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The probe process exited with a status outside the accepted set
    #[error("probe of {url} exited with {}: {stderr}", describe_code(.code))]
    ToolFailed {
        /// The URL that was probed
        url: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Trimmed standard error of the probe
        stderr: String,
    },

    /// The probe succeeded but did not print a channel id and name
    #[error("probe of {url} did not print a channel id and name (got {output:?})")]
    MissingOutput {
        /// The URL that was probed
        url: String,
        /// Raw standard output of the probe
        output: String,
    },
}

/// Item retrieval errors
///
/// These are recoverable: the dispatcher logs them and moves on to the next URL.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The retrieval tool reported a download failure for this item
    #[error("retrieval of {url} failed with {}: {reason}", describe_code(.code))]
    ItemFailed {
        /// The item URL
        url: String,
        /// Exit code of the retrieval tool
        code: Option<i32>,
        /// Last error line reported by the tool
        reason: String,
    },
}

/// Feed errors, scoped to a single channel
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed endpoint answered with a non-success status
    #[error("feed {url} returned HTTP {status}")]
    Http {
        /// Feed URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The feed body is neither RSS nor Atom
    #[error("failed to parse feed {url}: {reason}")]
    Parse {
        /// Feed URL
        url: String,
        /// Combined parser messages
        reason: String,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

impl Error {
    /// Machine-readable error code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Parse { .. } => "parse_error",
            Error::Io(_) => "io_error",
            Error::Resolution(e) => match e {
                ResolutionError::ToolFailed { .. } => "resolution_tool_failed",
                ResolutionError::MissingOutput { .. } => "resolution_missing_output",
            },
            Error::Download(DownloadError::ItemFailed { .. }) => "item_failed",
            Error::Feed(e) => match e {
                FeedError::Http { .. } => "feed_http_error",
                FeedError::Parse { .. } => "feed_parse_error",
            },
            Error::InvalidPattern { .. } => "invalid_pattern",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::Other(_) => "internal_error",
        }
    }

    /// Whether this failure is confined to one channel of a download run
    ///
    /// Channel-scoped failures are recorded and the run continues with the next
    /// channel. Everything else aborts the run.
    pub fn is_channel_scoped(&self) -> bool {
        matches!(
            self,
            Error::Feed(_) | Error::Network(_) | Error::InvalidPattern { .. }
        )
    }
}
