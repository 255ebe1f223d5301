//! Export of tagged accounts to external destinations
//!
//! Every destination implements [`Exporter`]. `export` makes a single attempt
//! and never fails: transport errors and non-2xx responses are logged and
//! reported in the returned [`ExportResult`] so one failing destination does
//! not stop the others or the rendering of results.

pub mod lifecycle;
pub mod s3;
pub mod sigv4;
pub mod vault;

pub use lifecycle::LifecyclePolicy;
pub use s3::{S3Client, S3Exporter};
pub use vault::VaultExporter;

use serde::Serialize;
use tracing::{error, info};

use crate::accounts::TaggedAccount;
use crate::error::CheckerError;

/// Outcome of one export attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportResult {
    pub destination: String,
    pub success: bool,
    pub error: Option<String>,
}

impl ExportResult {
    pub fn ok(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(destination: impl Into<String>, error: &CheckerError) -> Self {
        Self {
            destination: destination.into(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// A destination that accepts the JSON-encoded tagged accounts
pub trait Exporter {
    /// Human-readable destination, e.g. `s3://bucket/key`
    fn destination(&self) -> String;

    /// Encode the accounts into the body this destination expects
    fn payload(&self, accounts: &[TaggedAccount]) -> Result<Vec<u8>, CheckerError>;

    /// Deliver an encoded body; one attempt, no retries
    fn put(&self, body: Vec<u8>) -> Result<(), CheckerError>;

    fn try_export(&self, accounts: &[TaggedAccount]) -> Result<(), CheckerError> {
        let body = self.payload(accounts)?;
        self.put(body)
    }

    fn export(&self, accounts: &[TaggedAccount]) -> ExportResult {
        let destination = self.destination();
        match self.try_export(accounts) {
            Ok(()) => {
                info!("Exported {} account(s) to {}", accounts.len(), destination);
                ExportResult::ok(destination)
            }
            Err(e) => {
                error!("{}", e);
                ExportResult::failed(destination, &e)
            }
        }
    }
}

/// Prints what would be sent instead of sending it
pub struct DryRunExporter {
    inner: Box<dyn Exporter>,
}

impl DryRunExporter {
    pub fn new(inner: Box<dyn Exporter>) -> Self {
        Self { inner }
    }
}

impl Exporter for DryRunExporter {
    fn destination(&self) -> String {
        self.inner.destination()
    }

    fn payload(&self, accounts: &[TaggedAccount]) -> Result<Vec<u8>, CheckerError> {
        self.inner.payload(accounts)
    }

    fn put(&self, body: Vec<u8>) -> Result<(), CheckerError> {
        eprintln!("[dry-run] would export to {}:", self.inner.destination());
        eprintln!("{}", String::from_utf8_lossy(&body));
        Ok(())
    }
}

/// Run every exporter in order; a failure never skips the rest.
pub fn export_all(exporters: &[Box<dyn Exporter>], accounts: &[TaggedAccount]) -> Vec<ExportResult> {
    exporters.iter().map(|e| e.export(accounts)).collect()
}

/// Pretty JSON array, as stored in the object store
pub fn encode_pretty(accounts: &[TaggedAccount]) -> Result<Vec<u8>, CheckerError> {
    serde_json::to_vec_pretty(accounts)
        .map_err(|e| CheckerError::export("payload", format!("JSON encoding failed: {}", e)))
}
