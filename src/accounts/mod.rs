//! Account model shared by the normalizer, tagger, exporters and renderer.

pub mod normalize;

pub use normalize::{normalize_account, normalize_accounts};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account types reported by the aggregator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Investment,
    Depository,
    Credit,
    Loan,
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Investment => "investment",
            AccountType::Depository => "depository",
            AccountType::Credit => "credit",
            AccountType::Loan => "loan",
            AccountType::Other => "other",
        }
    }

    /// Map an aggregator type string. Anything outside the closed set
    /// (e.g. the legacy `brokerage` type) becomes `Other`.
    pub fn from_aggregator(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "investment" => AccountType::Investment,
            "depository" => AccountType::Depository,
            "credit" => AccountType::Credit,
            "loan" => AccountType::Loan,
            _ => AccountType::Other,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One account as fetched from the aggregator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub subtype: String,
}

/// An account plus its spending flag, as rendered and exported
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaggedAccount {
    #[serde(flatten)]
    pub account: AccountRecord,
    pub is_spending: bool,
}

impl TaggedAccount {
    pub fn id(&self) -> &str {
        &self.account.id
    }
}
