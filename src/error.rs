// src/error.rs
use std::fmt;

use thiserror::Error;

/// Why one province produced no payload this run. Never fatal to the run.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("timed out")]
    Timeout,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not found")]
    NotFound,
}

impl FetchFailure {
    /// Only transport trouble is worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchFailure::Network(_) | FetchFailure::Timeout)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            FetchFailure::Network(_) => "network_error",
            FetchFailure::Timeout => "timeout",
            FetchFailure::Parse(_) => "parse_error",
            FetchFailure::NotFound => "not_found",
        }
    }
}

/// Why a run chose not to publish. Not an error: the previous file stays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuppressReason {
    TooManyMissing { missing: usize, total: usize },
    TooManyFailed { failed: usize, total: usize },
    FetchCollapse { total: usize },
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuppressReason::TooManyMissing { missing, total } => {
                write!(f, "{missing} of {total} provinces have no price data")
            }
            SuppressReason::TooManyFailed { failed, total } => {
                write!(f, "{failed} of {total} province fetches failed")
            }
            SuppressReason::FetchCollapse { total } => {
                write!(f, "all {total} province fetches failed")
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    #[error("incomplete snapshot: expected {expected} provinces, got {found}")]
    IncompleteSnapshot { expected: usize, found: usize },

    #[error("publication suppressed: {0}")]
    PublicationSuppressed(SuppressReason),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

impl From<toml::de::Error> for PipelineError {
    fn from(e: toml::de::Error) -> Self {
        PipelineError::Config(e.to_string())
    }
}
