use tracing::info;

use super::rules::{classify, SpendingRules};
use crate::accounts::{AccountRecord, TaggedAccount};

/// Tag each record with its spending flag, keeping input order.
///
/// With `filter_id`, only the record with that id is kept; an id that
/// matches nothing yields an empty result rather than an error.
pub fn tag(
    records: &[AccountRecord],
    rules: &SpendingRules,
    filter_id: Option<&str>,
) -> Vec<TaggedAccount> {
    let tagged: Vec<TaggedAccount> = records
        .iter()
        .filter(|record| filter_id.map_or(true, |id| record.id == id))
        .map(|record| TaggedAccount {
            is_spending: classify(record, rules),
            account: record.clone(),
        })
        .collect();

    info!("Tagged {} account(s)", tagged.len());
    tagged
}
