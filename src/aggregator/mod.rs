//! Account sources
//!
//! The pipeline only needs raw account mappings; `AccountSource` is the seam
//! between it and whichever aggregator supplies them.

pub mod plaid;

pub use plaid::PlaidClient;

use serde_json::Value;
use tracing::error;

use crate::error::CheckerError;

/// Something that can list raw accounts for an access token
pub trait AccountSource {
    fn fetch_accounts(&self, access_token: &str) -> Result<Vec<Value>, CheckerError>;
}

/// Fetch raw accounts, logging an upstream failure and returning nothing.
pub fn fetch_or_empty(source: &dyn AccountSource, access_token: &str) -> Vec<Value> {
    match source.fetch_accounts(access_token) {
        Ok(accounts) => accounts,
        Err(e) => {
            error!("{}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(Result<Vec<Value>, CheckerError>);

    impl AccountSource for Fixed {
        fn fetch_accounts(&self, _access_token: &str) -> Result<Vec<Value>, CheckerError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_upstream_error_yields_empty() {
        let source = Fixed(Err(CheckerError::UpstreamApi("INVALID_ACCESS_TOKEN".into())));
        assert!(fetch_or_empty(&source, "token").is_empty());
    }

    #[test]
    fn test_accounts_pass_through() {
        let source = Fixed(Ok(vec![json!({"account_id": "a"})]));
        assert_eq!(fetch_or_empty(&source, "token").len(), 1);
    }
}
