//! Run configuration assembled from environment variables.
//!
//! Everything is read through a lookup function so callers (and tests) decide
//! where values come from; nothing here touches global state on its own.

use std::fmt;
use std::path::PathBuf;

use crate::error::CheckerError;

pub const DEFAULT_AWS_REGION: &str = "us-east-1";
pub const DEFAULT_WALLET_TYPE: &str = "google";
pub const EXPORT_PREFIX: &str = "portfolio_export/";

/// Aggregator environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Production,
    Development,
    Sandbox,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Sandbox => "sandbox",
        }
    }

    /// `PLAID_<ENV>_<SUFFIX>`
    pub fn var_name(&self, suffix: &str) -> String {
        format!("PLAID_{}_{}", self.as_str().to_ascii_uppercase(), suffix)
    }

    pub fn plaid_base_url(&self) -> String {
        format!("https://{}.plaid.com", self.as_str())
    }

    /// Object key the S3 exporter writes for this environment
    pub fn export_key(&self) -> String {
        format!("{}{}_portfolio.json", EXPORT_PREFIX, self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads process environment, treating empty values as unset.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn flag_enabled(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> bool {
    lookup(key)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Aggregator credentials for one environment
#[derive(Clone, PartialEq, Eq)]
pub struct PlaidCredentials {
    pub environment: Environment,
    pub client_id: String,
    pub secret: String,
    pub access_token: String,
    pub base_url: String,
}

impl fmt::Debug for PlaidCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaidCredentials")
            .field("environment", &self.environment)
            .field("client_id", &self.client_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PlaidCredentials {
    pub fn from_lookup(
        environment: Environment,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, CheckerError> {
        let require = |suffix: &str, what: &str| {
            let key = environment.var_name(suffix);
            lookup(&key).ok_or_else(|| {
                CheckerError::Configuration(format!("Missing {}. Set {}.", what, key))
            })
        };

        // Token first: it is the variable users most often forget.
        let access_token = require("ACCESS_TOKEN", "access token")?;
        let client_id = require("CLIENT_ID", "client id")?;
        let secret = require("SECRET", "secret")?;
        let base_url = lookup("PLAID_API_BASE_URL")
            .unwrap_or_else(|| environment.plaid_base_url())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            environment,
            client_id,
            secret,
            access_token,
            base_url,
        })
    }
}

/// Static AWS credentials
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// Object store destination settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: Option<String>,
    pub region: String,
    /// Custom endpoint (MinIO, localstack); switches to path-style URLs.
    pub endpoint: Option<String>,
    pub credentials: Option<AwsCredentials>,
}

impl S3Settings {
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let credentials = match (lookup("AWS_ACCESS_KEY_ID"), lookup("AWS_SECRET_ACCESS_KEY")) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token: lookup("AWS_SESSION_TOKEN"),
            }),
            _ => None,
        };

        Self {
            bucket: lookup("S3_BUCKET"),
            region: lookup("AWS_REGION")
                .or_else(|| lookup("AWS_DEFAULT_REGION"))
                .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            endpoint: lookup("S3_ENDPOINT_URL").map(|e| e.trim_end_matches('/').to_string()),
            credentials,
        }
    }
}

/// Wraps the vault payload with user metadata when configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEnvelopeSettings {
    pub user_id: String,
    pub wallet_type: String,
    pub preferred_asset: Option<String>,
}

/// Vault endpoint settings
#[derive(Clone, PartialEq, Eq)]
pub struct VaultSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub envelope: Option<VaultEnvelopeSettings>,
}

impl fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSettings")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("envelope", &self.envelope)
            .finish()
    }
}

impl VaultSettings {
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let envelope = lookup("VAULT_USER_ID").map(|user_id| VaultEnvelopeSettings {
            user_id,
            wallet_type: lookup("VAULT_WALLET_TYPE")
                .unwrap_or_else(|| DEFAULT_WALLET_TYPE.to_string()),
            preferred_asset: lookup("VAULT_PREFERRED_ASSET"),
        });

        Self {
            url: lookup("VAULT_URL"),
            api_key: lookup("VAULT_API_KEY"),
            envelope,
        }
    }
}

/// Which exporters run after tagging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportToggles {
    pub s3: bool,
    pub vault: bool,
}

impl ExportToggles {
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            s3: flag_enabled(lookup, "EXPORT_TO_S3"),
            vault: flag_enabled(lookup, "EXPORT_TO_VAULT"),
        }
    }
}

/// Everything one check run needs
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub plaid: PlaidCredentials,
    pub exports: ExportToggles,
    pub s3: S3Settings,
    pub vault: VaultSettings,
}

impl CheckerConfig {
    pub fn from_lookup(
        environment: Environment,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, CheckerError> {
        Ok(Self {
            plaid: PlaidCredentials::from_lookup(environment, lookup)?,
            exports: ExportToggles::from_lookup(lookup),
            s3: S3Settings::from_lookup(lookup),
            vault: VaultSettings::from_lookup(lookup),
        })
    }

    pub fn from_env(environment: Environment) -> Result<Self, CheckerError> {
        Self::from_lookup(environment, &env_lookup)
    }
}

/// `<config dir>/portfolio-checker/rules.toml`, if a config dir exists
pub fn default_rules_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join("portfolio-checker").join("rules.toml"))
}
