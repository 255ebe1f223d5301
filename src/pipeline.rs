//! One check run: fetch → normalize → tag → export.
//!
//! Rendering is left to the caller; this module only produces the tagged
//! accounts and the export outcomes.

use tracing::{error, info};

use crate::accounts::{normalize_accounts, TaggedAccount};
use crate::aggregator::{fetch_or_empty, AccountSource};
use crate::config::CheckerConfig;
use crate::export::{DryRunExporter, ExportResult, Exporter, S3Exporter, VaultExporter};
use crate::tagging::{tag, SpendingRules};

/// What a run produced
#[derive(Debug)]
pub struct CheckReport {
    pub accounts: Vec<TaggedAccount>,
    pub exports: Vec<ExportResult>,
}

impl CheckReport {
    pub fn all_exports_succeeded(&self) -> bool {
        self.exports.iter().all(|r| r.success)
    }
}

/// An exporter ready to run, or the failure that prevented building it
pub type PlannedExport = Result<Box<dyn Exporter>, ExportResult>;

/// Fetch, normalize and tag. Upstream failures yield an empty list.
pub fn check_accounts(
    source: &dyn AccountSource,
    access_token: &str,
    rules: &SpendingRules,
    filter_id: Option<&str>,
) -> Vec<TaggedAccount> {
    let raw = fetch_or_empty(source, access_token);
    let records = normalize_accounts(&raw);
    if records.len() < raw.len() {
        info!(
            "Skipped {} malformed account(s) out of {}",
            raw.len() - records.len(),
            raw.len()
        );
    }
    tag(&records, rules, filter_id)
}

/// Build the exporters enabled in `config`, S3 first then vault.
pub fn planned_exports(config: &CheckerConfig, dry_run: bool) -> Vec<PlannedExport> {
    let mut planned: Vec<PlannedExport> = Vec::new();
    let key = config.plaid.environment.export_key();

    if config.exports.s3 {
        planned.push(
            S3Exporter::from_settings(&config.s3, &key)
                .map(|e| Box::new(e) as Box<dyn Exporter>)
                .map_err(|e| {
                    let bucket = config.s3.bucket.as_deref().unwrap_or("<unset>");
                    let destination = format!("s3://{}/{}", bucket, key);
                    error!("S3 export unavailable: {}", e);
                    ExportResult::failed(destination, &e)
                }),
        );
    }

    if config.exports.vault {
        planned.push(
            VaultExporter::from_settings(&config.vault)
                .map(|e| Box::new(e) as Box<dyn Exporter>)
                .map_err(|e| {
                    let destination = config.vault.url.as_deref().unwrap_or("<unset vault>");
                    error!("Vault export unavailable: {}", e);
                    ExportResult::failed(destination, &e)
                }),
        );
    }

    if dry_run {
        planned
            .into_iter()
            .map(|p| p.map(|e| Box::new(DryRunExporter::new(e)) as Box<dyn Exporter>))
            .collect()
    } else {
        planned
    }
}

/// Run each planned export once, in order, collecting every outcome.
pub fn run_exports(planned: Vec<PlannedExport>, accounts: &[TaggedAccount]) -> Vec<ExportResult> {
    planned
        .into_iter()
        .map(|p| match p {
            Ok(exporter) => exporter.export(accounts),
            Err(unavailable) => unavailable,
        })
        .collect()
}

/// Full run against `source` using the credentials in `config`.
pub fn run(
    config: &CheckerConfig,
    source: &dyn AccountSource,
    rules: &SpendingRules,
    filter_id: Option<&str>,
    dry_run_exports: bool,
) -> CheckReport {
    let accounts = check_accounts(source, &config.plaid.access_token, rules, filter_id);
    let exports = run_exports(planned_exports(config, dry_run_exports), &accounts);
    CheckReport { accounts, exports }
}
