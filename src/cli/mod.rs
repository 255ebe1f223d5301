use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use portfolio_checker::config::Environment;
use portfolio_checker::export::lifecycle::{
    DEFAULT_EXPIRATION_DAYS, DEFAULT_NONCURRENT_EXPIRATION_DAYS,
};
use portfolio_checker::tagging::RulePolicy;

pub mod formatters;

#[derive(Parser)]
#[command(name = "portfolio-checker")]
#[command(version, about = "Tagged aggregator portfolio checker")]
#[command(
    long_about = "Fetch accounts from the aggregator, tag each one as spending or non-spending, optionally export the result to S3 and a vault endpoint, and print it as a table or JSON."
)]
pub struct Cli {
    /// Aggregator environment
    #[arg(long, value_enum, default_value_t = EnvArg::Production)]
    pub env: EnvArg,

    /// Only report the account with this id
    #[arg(long = "account-id")]
    pub account_id: Option<String>,

    /// Output results in JSON
    #[arg(long = "json-output")]
    pub json_output: bool,

    /// Built-in spending rule table
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// TOML rule table; takes precedence over --policy
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Print export payloads instead of sending them
    #[arg(long = "dry-run-exports")]
    pub dry_run_exports: bool,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the export retention rule to an S3 bucket
    ApplyLifecycle {
        /// Bucket name (defaults to S3_BUCKET)
        #[arg(long)]
        bucket: Option<String>,

        /// Key prefix the rule applies to
        #[arg(long, default_value = "portfolio_export/")]
        prefix: String,

        /// Expire current objects after this many days
        #[arg(long, default_value_t = DEFAULT_EXPIRATION_DAYS)]
        expiration_days: u32,

        /// Expire overwritten versions after this many days
        #[arg(long, default_value_t = DEFAULT_NONCURRENT_EXPIRATION_DAYS)]
        noncurrent_days: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvArg {
    Production,
    Development,
    Sandbox,
}

impl From<EnvArg> for Environment {
    fn from(value: EnvArg) -> Self {
        match value {
            EnvArg::Production => Environment::Production,
            EnvArg::Development => Environment::Development,
            EnvArg::Sandbox => Environment::Sandbox,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Investment subtype `other` is non-spending
    OtherNonSpending,
    /// Only brokerage/cash/checking/savings investments are spending
    ListedSpending,
}

impl From<PolicyArg> for RulePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::OtherNonSpending => RulePolicy::OtherNonSpending,
            PolicyArg::ListedSpending => RulePolicy::ListedSpending,
        }
    }
}
