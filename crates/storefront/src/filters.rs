//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use conker_core::price::format_usd;
use rust_decimal::Decimal;

/// Formats an amount as US dollars with two decimal places.
///
/// Values that are not decimal numbers are passed through behind a `$`.
///
/// Usage in templates: `{{ item.line_total|usd }}`
#[askama::filter_fn]
pub fn usd(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(Decimal::from_str(&text).map_or_else(|_| format!("${text}"), format_usd))
}
