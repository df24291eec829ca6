//! Money and date formatting for shell output.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("GHS")
    }
}

/// Separators used when printing numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl LocaleConfig {
    /// Picks separators for a BCP 47 tag. Unknown tags use `.` and `,`.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let (decimal_separator, grouping_separator) = match language.as_str() {
            "fr" => (',', ' '),
            "de" | "es" | "pt" | "it" => (',', '.'),
            _ => ('.', ','),
        };
        Self {
            language_tag: tag.to_string(),
            decimal_separator,
            grouping_separator,
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::from_tag("en-GH")
    }
}

pub fn minor_units_for(code: &str) -> u32 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Renders `value` with grouping and exactly `precision` fractional digits.
pub fn format_number(locale: &LocaleConfig, value: Decimal, precision: u32) -> String {
    let mut rounded =
        value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(precision);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };
    let mut body = group_digits(int_part, locale.grouping_separator);
    if let Some(frac) = frac_part {
        body.push(locale.decimal_separator);
        body.push_str(frac);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        body.insert(0, '-');
    }
    body
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// `GHS 1,234.50`; negative values render as `-GHS 5.00`.
pub fn format_currency_value(amount: Decimal, code: &CurrencyCode, locale: &LocaleConfig) -> String {
    let body = format_number(locale, amount.abs(), minor_units_for(code.as_str()));
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-{} {}", code.as_str(), body)
    } else {
        format!("{} {}", code.as_str(), body)
    }
}

/// `61.44%`, or `n/a` when there is no percentage.
pub fn format_percent(locale: &LocaleConfig, value: Option<Decimal>) -> String {
    match value {
        Some(value) => format!("{}%", format_number(locale, value, 2)),
        None => "n/a".into(),
    }
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d %b %Y").to_string()
}

pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.format("%d %b %Y %H:%M").to_string()
}
