//! Format delegate.
//!
//! The `localize` capability hands values to a [`Formatter`] together with
//! the negotiated locale. [`BasicFormatter`] covers numbers, percentages,
//! currency amounts and dates with per-language separators and date order;
//! hosts needing full CLDR data install their own formatter.

use crate::Locale;
use chrono::{Datelike, NaiveDate};

/// A value to localize.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatValue {
    Number(f64),
    /// A ratio, `0.5` renders as 50%
    Percent(f64),
    Currency { amount: f64, code: String },
    Date(NaiveDate),
}

impl FormatValue {
    pub fn currency(amount: f64, code: impl Into<String>) -> Self {
        FormatValue::Currency {
            amount,
            code: code.into().to_uppercase(),
        }
    }
}

impl From<f64> for FormatValue {
    fn from(n: f64) -> Self {
        FormatValue::Number(n)
    }
}

impl From<i64> for FormatValue {
    fn from(n: i64) -> Self {
        FormatValue::Number(n as f64)
    }
}

impl From<NaiveDate> for FormatValue {
    fn from(date: NaiveDate) -> Self {
        FormatValue::Date(date)
    }
}

/// External formatter seam.
pub trait Formatter: Send + Sync {
    fn format(&self, value: &FormatValue, locale: &Locale) -> String;
}

/// Built-in formatter.
#[derive(Debug, Clone)]
pub struct BasicFormatter {
    /// Fraction digits kept for plain numbers
    pub max_fraction_digits: usize,
}

impl Default for BasicFormatter {
    fn default() -> Self {
        Self {
            max_fraction_digits: 2,
        }
    }
}

impl BasicFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_fraction_digits(mut self, digits: usize) -> Self {
        self.max_fraction_digits = digits;
        self
    }

    fn number(&self, n: f64, min_fraction: usize, max_fraction: usize, locale: &Locale) -> String {
        let (decimal, group) = separators(locale);

        let fixed = format!("{:.1$}", n.abs(), max_fraction.max(min_fraction));
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (fixed.as_str(), ""),
        };

        let mut frac = frac_part.trim_end_matches('0');
        if frac.len() < min_fraction {
            frac = &frac_part[..min_fraction];
        }

        let mut out = String::with_capacity(fixed.len() + 4);
        if n < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
            out.push('-');
        }
        out.push_str(&group_digits(int_part, group));
        if !frac.is_empty() {
            out.push_str(decimal);
            out.push_str(frac);
        }
        out
    }

    fn currency(&self, amount: f64, code: &str, locale: &Locale) -> String {
        let formatted = self.number(amount.abs(), 2, 2, locale);
        let sign = if amount < 0.0 { "-" } else { "" };
        let symbol = currency_symbol(code);

        if symbol_first(locale) {
            format!("{}{}{}", sign, symbol, formatted)
        } else {
            format!("{}{} {}", sign, formatted, symbol)
        }
    }

    fn date(&self, date: NaiveDate, locale: &Locale) -> String {
        let (y, m, d) = (date.year(), date.month(), date.day());
        match date_order(locale) {
            DateOrder::Ymd => format!("{}-{:02}-{:02}", y, m, d),
            DateOrder::Dmy => {
                let sep = if matches!(locale.language(), "de" | "ru" | "pl" | "cs" | "fi" | "nb" | "uk") {
                    '.'
                } else {
                    '/'
                };
                format!("{:02}{sep}{:02}{sep}{}", d, m, y)
            }
            DateOrder::Mdy => format!("{}/{}/{}", m, d, y),
        }
    }
}

impl Formatter for BasicFormatter {
    fn format(&self, value: &FormatValue, locale: &Locale) -> String {
        match value {
            FormatValue::Number(n) => self.number(*n, 0, self.max_fraction_digits, locale),
            FormatValue::Percent(n) => format!("{}%", self.number(n * 100.0, 0, 1, locale)),
            FormatValue::Currency { amount, code } => self.currency(*amount, code, locale),
            FormatValue::Date(date) => self.date(*date, locale),
        }
    }
}

enum DateOrder {
    Mdy,
    Dmy,
    Ymd,
}

fn date_order(locale: &Locale) -> DateOrder {
    match (locale.language(), locale.region()) {
        ("ja" | "zh" | "ko" | "hu" | "lt" | "sv", _) => DateOrder::Ymd,
        ("en", Some("US") | None) => DateOrder::Mdy,
        _ => DateOrder::Dmy,
    }
}

/// Decimal and grouping separators.
fn separators(locale: &Locale) -> (&'static str, &'static str) {
    match locale.language() {
        "de" | "es" | "it" | "pt" | "nl" | "da" | "id" | "tr" | "el" | "ro" | "vi" => (",", "."),
        "fr" | "ru" | "uk" | "pl" | "cs" | "sk" | "fi" | "nb" | "sv" | "hu" | "bg" => (",", "\u{a0}"),
        _ => (".", ","),
    }
}

fn group_digits(digits: &str, sep: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

fn symbol_first(locale: &Locale) -> bool {
    !matches!(
        locale.language(),
        "de" | "fr" | "es" | "it" | "pt" | "nl" | "da" | "sv" | "nb" | "fi" | "pl" | "cs" | "sk"
            | "hu" | "ro" | "bg" | "el" | "ru" | "uk" | "vi"
    )
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "KRW" => "₩",
        "INR" => "₹",
        "RUB" => "₽",
        "BRL" => "R$",
        "CAD" => "CA$",
        "AUD" => "A$",
        "PLN" => "zł",
        "CZK" => "Kč",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value: FormatValue, tag: &str) -> String {
        BasicFormatter::new().format(&value, &Locale::parse(tag).unwrap())
    }

    #[test]
    fn test_numbers() {
        assert_eq!(fmt(1234567.891.into(), "en-US"), "1,234,567.89");
        assert_eq!(fmt(1234567.891.into(), "de-DE"), "1.234.567,89");
        assert_eq!(fmt(1234567.5.into(), "fr"), "1\u{a0}234\u{a0}567,5");
        assert_eq!(fmt(1000.0.into(), "en-US"), "1,000");
        assert_eq!(fmt((-1234.5).into(), "en-US"), "-1,234.5");
        assert_eq!(fmt(42i64.into(), "ja"), "42");
    }

    #[test]
    fn test_percent() {
        assert_eq!(fmt(FormatValue::Percent(0.75), "en-US"), "75%");
        assert_eq!(fmt(FormatValue::Percent(0.125), "de"), "12,5%");
    }

    #[test]
    fn test_currency() {
        assert_eq!(fmt(FormatValue::currency(99.99, "usd"), "en-US"), "$99.99");
        assert_eq!(fmt(FormatValue::currency(99.99, "EUR"), "de-DE"), "99,99 €");
        assert_eq!(fmt(FormatValue::currency(-5.0, "GBP"), "en-GB"), "-£5.00");
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(fmt(date.into(), "en-US"), "1/15/2024");
        assert_eq!(fmt(date.into(), "en-GB"), "15/01/2024");
        assert_eq!(fmt(date.into(), "de"), "15.01.2024");
        assert_eq!(fmt(date.into(), "ja"), "2024-01-15");
    }
}
