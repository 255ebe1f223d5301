use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::fmt;

use super::Exporter;
use crate::accounts::TaggedAccount;
use crate::config::{VaultEnvelopeSettings, VaultSettings};
use crate::error::CheckerError;

/// Payload wrapper used when the vault stores per-user snapshots
#[derive(Debug, Serialize)]
struct VaultEnvelope<'a> {
    user_id: &'a str,
    wallet_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred_asset: Option<&'a str>,
    portfolio: &'a [TaggedAccount],
    timestamp: String,
}

/// POSTs the tagged accounts to a vault/webhook URL with a bearer token
#[derive(Clone)]
pub struct VaultExporter {
    http: Client,
    url: String,
    api_key: String,
    envelope: Option<VaultEnvelopeSettings>,
}

impl fmt::Debug for VaultExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultExporter")
            .field("url", &self.url)
            .field("envelope", &self.envelope)
            .finish_non_exhaustive()
    }
}

impl VaultExporter {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        envelope: Option<VaultEnvelopeSettings>,
    ) -> Result<Self, CheckerError> {
        let http = Client::builder()
            .build()
            .map_err(|e| CheckerError::Configuration(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
            envelope,
        })
    }

    pub fn from_settings(settings: &VaultSettings) -> Result<Self, CheckerError> {
        let url = settings.url.clone().ok_or_else(|| {
            CheckerError::Configuration("Missing vault URL. Set VAULT_URL.".to_string())
        })?;
        let api_key = settings.api_key.clone().ok_or_else(|| {
            CheckerError::Configuration("Missing vault API key. Set VAULT_API_KEY.".to_string())
        })?;
        Self::new(url, api_key, settings.envelope.clone())
    }
}

impl Exporter for VaultExporter {
    fn destination(&self) -> String {
        self.url.clone()
    }

    fn payload(&self, accounts: &[TaggedAccount]) -> Result<Vec<u8>, CheckerError> {
        let encoded = match &self.envelope {
            None => serde_json::to_vec(accounts),
            Some(envelope) => serde_json::to_vec(&VaultEnvelope {
                user_id: &envelope.user_id,
                wallet_type: &envelope.wallet_type,
                preferred_asset: envelope.preferred_asset.as_deref(),
                portfolio: accounts,
                timestamp: Utc::now().to_rfc3339(),
            }),
        };
        encoded.map_err(|e| CheckerError::export(&self.url, format!("JSON encoding failed: {}", e)))
    }

    fn put(&self, body: Vec<u8>) -> Result<(), CheckerError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| CheckerError::export(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckerError::export(&self.url, format!("HTTP {}", status)));
        }
        Ok(())
    }
}
