//! Utility functions for formatting balances
//!
//! Centralizes currency display so the table renderer and log lines agree.

use rust_decimal::Decimal;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "$" prefix
    Usd,
    /// No currency symbol
    None,
}

/// Core formatting function.
///
/// Formats a Decimal with US conventions: `,` thousands separator, `.`
/// decimal separator, two decimal places, sign before the symbol.
///
/// # Examples
/// ```
/// use portfolio_checker::utils::{format_currency_with_symbol, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_symbol(dec!(1234.5), CurrencySymbol::Usd),
///     "$1,234.50"
/// );
/// assert_eq!(
///     format_currency_with_symbol(dec!(-1234567), CurrencySymbol::None),
///     "-1,234,567.00"
/// );
/// ```
pub fn format_currency_with_symbol(value: Decimal, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs().round_dp(2));
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Usd => "$",
        CurrencySymbol::None => "",
    };

    format!("{}{}{}.{}", sign, prefix, with_separators, decimal_part)
}

/// Format as dollars: "$1,234.56"
///
/// # Examples
/// ```
/// use portfolio_checker::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(2000.0)), "$2,000.00");
/// assert_eq!(format_currency(dec!(-5)), "-$5.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_symbol(value, CurrencySymbol::Usd)
}
