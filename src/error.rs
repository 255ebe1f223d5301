//! Error handling for the portfolio checker
//!
//! Defines the typed error kinds callers branch on, and the crate-wide
//! Result alias used by orchestration code for context chaining.

use thiserror::Error;

/// Error kinds surfaced by the fetch, normalize and export stages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckerError {
    /// Missing or invalid credential/variable. Fatal for the run.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A raw account lacked a required field; the record is skipped.
    #[error("malformed record {account_id}: missing or invalid `{field}`")]
    MalformedRecord { account_id: String, field: String },

    /// The aggregator call failed; the run continues with no accounts.
    #[error("upstream API error: {0}")]
    UpstreamApi(String),

    /// Transport failure or non-2xx response from an export destination.
    #[error("export to {destination} failed: {reason}")]
    Export { destination: String, reason: String },
}

impl CheckerError {
    pub fn export(destination: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        CheckerError::Export {
            destination: destination.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(account_id: impl Into<String>, field: impl Into<String>) -> Self {
        CheckerError::MalformedRecord {
            account_id: account_id.into(),
            field: field.into(),
        }
    }
}

/// Result type alias for orchestration code
pub type Result<T> = anyhow::Result<T>;
