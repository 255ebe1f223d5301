//! Raw aggregator payload → `AccountRecord`

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

use super::{AccountRecord, AccountType};
use crate::error::CheckerError;

const UNKNOWN_ID: &str = "<unknown>";

/// Convert one raw account mapping into an `AccountRecord`.
///
/// Requires `account_id`, `name`, `type`, `subtype` and `balances.current`.
/// A missing or null field is reported as `MalformedRecord`.
pub fn normalize_account(raw: &Value) -> Result<AccountRecord, CheckerError> {
    let id = required_str(raw, "account_id", UNKNOWN_ID)?;
    let name = required_str(raw, "name", &id)?;
    let account_type = required_str(raw, "type", &id)?;
    let subtype = required_str(raw, "subtype", &id)?;

    let balance = raw
        .get("balances")
        .and_then(|b| b.get("current"))
        .and_then(parse_decimal)
        .ok_or_else(|| CheckerError::malformed(&id, "balances.current"))?;

    Ok(AccountRecord {
        id,
        name,
        balance,
        account_type: AccountType::from_aggregator(&account_type),
        subtype,
    })
}

/// Normalize a batch, skipping (and logging) malformed records.
pub fn normalize_accounts(raws: &[Value]) -> Vec<AccountRecord> {
    raws.iter()
        .filter_map(|raw| match normalize_account(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping account: {}", e);
                None
            }
        })
        .collect()
}

fn required_str(raw: &Value, field: &str, id: &str) -> Result<String, CheckerError> {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CheckerError::malformed(id, field))
}

/// Parse through the number's text so `4532.10` does not pick up binary noise.
fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
