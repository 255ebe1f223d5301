//! Output formatting for CLI display
//!
//! Keeps presentation apart from the pipeline: everything here takes the
//! finished run results and returns strings.

use colored::Colorize;
use portfolio_checker::accounts::TaggedAccount;
use portfolio_checker::export::ExportResult;
use portfolio_checker::utils::format_currency;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

/// Pretty JSON array of tagged accounts
pub fn format_accounts_json(accounts: &[TaggedAccount]) -> String {
    serde_json::to_string_pretty(accounts)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

fn spending_label(is_spending: bool) -> String {
    if is_spending {
        format!("🟢 {}", "Spending".green())
    } else {
        format!("🔴 {}", "Non-Spending".red())
    }
}

/// Table of tagged accounts for terminal output
pub fn format_accounts_table(accounts: &[TaggedAccount]) -> String {
    #[derive(Tabled)]
    struct AccountRow {
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Account")]
        name: String,
        #[tabled(rename = "Balance")]
        balance: String,
        #[tabled(rename = "Type")]
        account_type: String,
        #[tabled(rename = "Subtype")]
        subtype: String,
    }

    let rows: Vec<AccountRow> = accounts
        .iter()
        .map(|t| AccountRow {
            status: spending_label(t.is_spending),
            name: t.account.name.clone(),
            balance: format_currency(t.account.balance),
            account_type: t.account.account_type.to_string(),
            subtype: t.account.subtype.clone(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..3), Alignment::right());

    let spending = accounts.iter().filter(|t| t.is_spending).count();
    format!(
        "{}\n{} spending, {} non-spending\n",
        table,
        spending.to_string().green(),
        (accounts.len() - spending).to_string().red()
    )
}

/// Message when nothing matched
pub fn format_no_accounts(filter_id: Option<&str>) -> String {
    match filter_id {
        Some(id) => format!("{} No accounts matched id {}\n", "ℹ".blue().bold(), id.bold()),
        None => format!("{} No accounts matched\n", "ℹ".blue().bold()),
    }
}

/// One line per export attempt
pub fn format_export_summary(results: &[ExportResult]) -> String {
    results
        .iter()
        .map(|r| match &r.error {
            None => format!("{} Exported to {}\n", "✓".green().bold(), r.destination),
            Some(e) => format!("{} Export to {} failed: {}\n", "✗".red().bold(), r.destination, e),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_checker::accounts::{AccountRecord, AccountType};
    use portfolio_checker::error::CheckerError;
    use rust_decimal_macros::dec;

    fn tagged(name: &str, is_spending: bool) -> TaggedAccount {
        TaggedAccount {
            account: AccountRecord {
                id: format!("{}_id", name),
                name: name.to_string(),
                balance: dec!(4532.10),
                account_type: AccountType::Investment,
                subtype: "brokerage".to_string(),
            },
            is_spending,
        }
    }

    #[test]
    fn test_table_lists_accounts_and_flags() {
        colored::control::set_override(false);
        let out = format_accounts_table(&[tagged("Brokerage", true), tagged("Demo", false)]);
        assert!(out.contains("Spending"));
        assert!(out.contains("Non-Spending"));
        assert!(out.contains("$4,532.10"));
        assert!(out.contains("1 spending, 1 non-spending"));
    }

    #[test]
    fn test_json_is_parseable() {
        let out = format_accounts_json(&[tagged("Brokerage", true)]);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["name"], "Brokerage");
    }

    #[test]
    fn test_no_accounts_message_names_filter() {
        colored::control::set_override(false);
        assert!(format_no_accounts(Some("acc_9")).contains("acc_9"));
    }

    #[test]
    fn test_export_summary() {
        colored::control::set_override(false);
        let results = vec![
            ExportResult::ok("s3://b/k"),
            ExportResult::failed("https://vault", &CheckerError::export("https://vault", "HTTP 500")),
        ];
        let out = format_export_summary(&results);
        assert!(out.contains("Exported to s3://b/k"));
        assert!(out.contains("Export to https://vault failed"));
    }
}
