//! Routes parsed CLI arguments to the check run or the lifecycle command.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::{formatters, Cli, Commands};
use portfolio_checker::aggregator::PlaidClient;
use portfolio_checker::config::{self, CheckerConfig, Environment, S3Settings};
use portfolio_checker::export::{LifecyclePolicy, S3Client};
use portfolio_checker::pipeline;
use portfolio_checker::tagging::{RulePolicy, SpendingRules};

const FALLBACK_POLICY: RulePolicy = RulePolicy::ListedSpending;

pub fn dispatch(mut cli: Cli) -> Result<()> {
    match cli.command.take() {
        Some(Commands::ApplyLifecycle {
            bucket,
            prefix,
            expiration_days,
            noncurrent_days,
        }) => dispatch_apply_lifecycle(
            bucket,
            LifecyclePolicy {
                prefix,
                expiration_days,
                noncurrent_expiration_days: noncurrent_days,
                ..LifecyclePolicy::default()
            },
        ),
        None => dispatch_check(&cli),
    }
}

/// Pick the rule table: `--rules` file, then `--policy`, then the default
/// rules file, then the fallback policy with a warning.
fn resolve_rules(rules_path: Option<&Path>, policy: Option<RulePolicy>) -> Result<SpendingRules> {
    if let Some(path) = rules_path {
        info!("Using spending rules from {}", path.display());
        return SpendingRules::load(path);
    }
    if let Some(policy) = policy {
        info!("Using spending policy '{}'", policy);
        return Ok(policy.rules());
    }
    if let Some(path) = config::default_rules_path().filter(|p| p.exists()) {
        info!("Using spending rules from {}", path.display());
        return SpendingRules::load(&path);
    }

    warn!(
        "No spending policy chosen; defaulting to '{}'. '{}' classifies unlisted investment subtypes differently. Pass --policy or --rules to choose explicitly.",
        FALLBACK_POLICY,
        RulePolicy::OtherNonSpending
    );
    Ok(FALLBACK_POLICY.rules())
}

fn dispatch_check(cli: &Cli) -> Result<()> {
    let environment = Environment::from(cli.env);
    let rules = resolve_rules(cli.rules.as_deref(), cli.policy.map(RulePolicy::from))?;
    let config = CheckerConfig::from_env(environment)?;
    let source = PlaidClient::new(&config.plaid)?;

    info!("Checking {} accounts", environment);
    let report = pipeline::run(
        &config,
        &source,
        &rules,
        cli.account_id.as_deref(),
        cli.dry_run_exports,
    );

    if cli.json_output {
        println!("{}", formatters::format_accounts_json(&report.accounts));
        return Ok(());
    }

    if report.accounts.is_empty() {
        print!("{}", formatters::format_no_accounts(cli.account_id.as_deref()));
    } else {
        print!("{}", formatters::format_accounts_table(&report.accounts));
    }
    if !report.exports.is_empty() {
        print!("\n{}", formatters::format_export_summary(&report.exports));
    }
    Ok(())
}

fn dispatch_apply_lifecycle(bucket: Option<String>, policy: LifecyclePolicy) -> Result<()> {
    let settings = S3Settings::from_lookup(&config::env_lookup);
    let bucket = bucket
        .or_else(|| settings.bucket.clone())
        .context("No bucket given. Pass --bucket or set S3_BUCKET.")?;
    let client = S3Client::new(&settings)?;

    client
        .put_bucket_lifecycle(&bucket, &policy)
        .with_context(|| format!("Failed to apply lifecycle rules to {}", bucket))?;

    info!("Lifecycle rule {} applied to {}", policy.id, bucket);
    println!(
        "✅ Retention rules applied to bucket: {} (prefix {}, expire after {} days, noncurrent after {} days)",
        bucket, policy.prefix, policy.expiration_days, policy.noncurrent_expiration_days
    );
    Ok(())
}
