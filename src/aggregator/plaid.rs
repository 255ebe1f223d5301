use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::AccountSource;
use crate::config::PlaidCredentials;
use crate::error::CheckerError;

const USER_AGENT: &str = "portfolio-checker/0.1";

#[derive(Debug, Serialize)]
struct AccountsGetRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
    access_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccountsGetResponse {
    accounts: Vec<Value>,
    #[serde(default)]
    request_id: Option<String>,
}

/// Plaid error body
#[derive(Debug, Deserialize)]
struct PlaidErrorBody {
    error_type: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
}

impl PlaidErrorBody {
    fn describe(&self) -> String {
        format!(
            "{} {}: {}",
            self.error_type.as_deref().unwrap_or("API_ERROR"),
            self.error_code.as_deref().unwrap_or("UNKNOWN"),
            self.error_message.as_deref().unwrap_or("no message")
        )
    }
}

/// Blocking client for Plaid's `/accounts/get`
#[derive(Debug, Clone)]
pub struct PlaidClient {
    http: Client,
    base_url: String,
    client_id: String,
    secret: String,
}

impl PlaidClient {
    pub fn new(credentials: &PlaidCredentials) -> Result<Self, CheckerError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CheckerError::Configuration(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: credentials.base_url.clone(),
            client_id: credentials.client_id.clone(),
            secret: credentials.secret.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl AccountSource for PlaidClient {
    fn fetch_accounts(&self, access_token: &str) -> Result<Vec<Value>, CheckerError> {
        let url = format!("{}/accounts/get", self.base_url);
        info!("Fetching accounts from {}", url);

        let response = self
            .http
            .post(&url)
            .json(&AccountsGetRequest {
                client_id: &self.client_id,
                secret: &self.secret,
                access_token,
            })
            .send()
            .map_err(|e| CheckerError::UpstreamApi(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<PlaidErrorBody>()
                .map(|body| body.describe())
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(CheckerError::UpstreamApi(format!(
                "Plaid returned {}: {}",
                status, detail
            )));
        }

        let body: AccountsGetResponse = response
            .json()
            .map_err(|e| CheckerError::UpstreamApi(format!("invalid accounts response: {}", e)))?;

        debug!(
            "Plaid request {} returned {} account(s)",
            body.request_id.as_deref().unwrap_or("-"),
            body.accounts.len()
        );
        Ok(body.accounts)
    }
}
