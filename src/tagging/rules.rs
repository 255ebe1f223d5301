use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::accounts::{AccountRecord, AccountType};
use crate::error::Result;

/// Rule table deciding which accounts count as spending.
///
/// Non-investment accounts are spending unless their subtype is listed in
/// `non_spending_subtypes`. Investment accounts check `non_spending_subtypes`
/// first, then `spending_subtypes`, then fall back to `default_when_unlisted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpendingRules {
    pub non_spending_subtypes: BTreeSet<String>,
    pub spending_subtypes: BTreeSet<String>,
    pub default_when_unlisted: bool,
}

impl Default for SpendingRules {
    fn default() -> Self {
        Self {
            non_spending_subtypes: BTreeSet::new(),
            spending_subtypes: BTreeSet::new(),
            default_when_unlisted: true,
        }
    }
}

impl SpendingRules {
    pub fn new<N, S>(non_spending: N, spending: S, default_when_unlisted: bool) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            non_spending_subtypes: non_spending.into_iter().map(Into::into).collect(),
            spending_subtypes: spending.into_iter().map(Into::into).collect(),
            default_when_unlisted,
        }
    }

    /// Parse a rule table from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid spending rules TOML")
    }

    /// Load a rule table from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load rules file {}", path.display()))
    }
}

/// The two rule tables in use across the existing tooling. They disagree on
/// investment subtypes that neither lists, so callers must pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePolicy {
    /// Investment accounts with subtype `other` are non-spending; everything
    /// else is spending.
    OtherNonSpending,
    /// Only investment accounts with a brokerage/cash/checking/savings
    /// subtype are spending; unlisted investment subtypes are not.
    ListedSpending,
}

impl RulePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulePolicy::OtherNonSpending => "other-non-spending",
            RulePolicy::ListedSpending => "listed-spending",
        }
    }

    pub fn rules(&self) -> SpendingRules {
        match self {
            RulePolicy::OtherNonSpending => SpendingRules::new(["other"], [] as [&str; 0], true),
            RulePolicy::ListedSpending => SpendingRules::new(
                [] as [&str; 0],
                ["brokerage", "cash", "checking", "savings"],
                false,
            ),
        }
    }
}

impl fmt::Display for RulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RulePolicy {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "other-non-spending" => Ok(RulePolicy::OtherNonSpending),
            "listed-spending" => Ok(RulePolicy::ListedSpending),
            _ => Err(()),
        }
    }
}

/// Decide whether an account is a spending account under `rules`.
pub fn classify(record: &AccountRecord, rules: &SpendingRules) -> bool {
    if rules.non_spending_subtypes.contains(&record.subtype) {
        return false;
    }
    match record.account_type {
        AccountType::Investment => {
            if rules.spending_subtypes.contains(&record.subtype) {
                true
            } else {
                rules.default_when_unlisted
            }
        }
        _ => true,
    }
}
