//! Unified error types for the market dashboard.

use serde::Serialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Unified error type for the market dashboard.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid table query.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Market listing fetch error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variables could not be deserialized.
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    /// The markets endpoint is not a usable URL.
    #[error("invalid MARKETS_API_URL {url}: {reason}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A numeric setting is out of range.
    #[error("invalid {name}: {reason}")]
    OutOfRange {
        /// Setting name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Rejected table query parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Pages are 1-based.
    #[error("invalid page {0}: pages start at 1")]
    InvalidPage(u32),

    /// Page size outside the offered choices.
    #[error("invalid page size {0}: expected one of 5, 10, 20, 50, 100")]
    InvalidPageSize(u32),
}

/// Broad class of a fetch failure, used as a log field and metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FetchErrorKind {
    /// The endpoint could not be reached or did not return parseable JSON.
    Transport,
    /// The endpoint answered with JSON that is not a list of records.
    Format,
}

/// Errors raised while fetching one page of market records.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request itself failed (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The body is not JSON, or a record failed to decode.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The body is JSON but not an array of records.
    #[error("unexpected response format: expected an array, got {found}")]
    Format {
        /// JSON type that was received instead.
        found: &'static str,
    },
}

impl FetchError {
    /// Classify the failure for logging.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Format { .. } => FetchErrorKind::Format,
            FetchError::Transport(_) | FetchError::Status { .. } | FetchError::Parse(_) => {
                FetchErrorKind::Transport
            }
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
