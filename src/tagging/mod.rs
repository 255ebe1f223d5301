//! Spending classification
//!
//! `rules` holds the classifier and its configurable rule table; `tagger`
//! applies it to a batch of accounts.

pub mod rules;
pub mod tagger;

pub use rules::{classify, RulePolicy, SpendingRules};
pub use tagger::tag;
