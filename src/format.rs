//! Formatting of calculator outputs for display.
//!
//! The calculator itself only deals in raw numbers; everything the user reads goes through here.
use crate::finance::Payback;
use itertools::Itertools;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// The conventions used for separators when displaying numbers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    clap::ValueEnum,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum NumberLocale {
    /// Spanish: `1.234.567,89`
    #[default]
    #[string = "es"]
    Es,
    /// English: `1,234,567.89`
    #[string = "en"]
    En,
}

impl NumberLocale {
    fn thousands_separator(self) -> &'static str {
        match self {
            Self::Es => ".",
            Self::En => ",",
        }
    }

    fn decimal_separator(self) -> &'static str {
        match self {
            Self::Es => ",",
            Self::En => ".",
        }
    }
}

/// Format a number with thousands separators and a fixed number of decimal places
pub fn format_number(value: f64, decimals: usize, locale: NumberLocale) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = formatted
        .split_once('.')
        .map_or((formatted.as_str(), None), |(i, f)| (i, Some(f)));

    // Group digits in threes, starting from the right
    let digits = integer.chars().collect_vec();
    let grouped = digits
        .rchunks(3)
        .rev()
        .map(|chunk| chunk.iter().collect::<String>())
        .join(locale.thousands_separator());

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(fraction) => format!("{sign}{grouped}{}{fraction}", locale.decimal_separator()),
        None => format!("{sign}{grouped}"),
    }
}

/// Format an amount of money, rounded to whole units
pub fn format_money(value: f64, locale: NumberLocale) -> String {
    let number = format_number(value, 0, locale);
    match number.strip_prefix('-') {
        Some(abs) => format!("-${abs}"),
        None => format!("${number}"),
    }
}

/// Format an amount which is already expressed in millions
pub fn format_millions(value: f64, locale: NumberLocale) -> String {
    let money = format_money(value, locale);
    match locale {
        NumberLocale::Es => format!("MM{money}"),
        NumberLocale::En => format!("{money}M"),
    }
}

/// Format a percentage, showing decimals only when the value is not whole
pub fn format_percent(value: f64, locale: NumberLocale) -> String {
    let decimals = if value.fract().abs() < f64::EPSILON { 0 } else { 1 };
    format!("{}%", format_number(value, decimals, locale))
}

/// Format a payback period
pub fn format_payback(payback: Payback, locale: NumberLocale) -> String {
    match (payback, locale) {
        (Payback::Months(months), NumberLocale::Es) => format!("{months} meses"),
        (Payback::Months(months), NumberLocale::En) => format!("{months} months"),
        (Payback::NotAchievable, NumberLocale::Es) => "no recuperable".into(),
        (Payback::NotAchievable, NumberLocale::En) => "not achievable".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(350_000_000.0, 0, NumberLocale::Es, "350.000.000")]
    #[case(350_000_000.0, 0, NumberLocale::En, "350,000,000")]
    #[case(1234.5678, 2, NumberLocale::Es, "1.234,57")]
    #[case(1234.5678, 2, NumberLocale::En, "1,234.57")]
    #[case(999.0, 0, NumberLocale::En, "999")]
    #[case(1000.0, 0, NumberLocale::En, "1,000")]
    #[case(0.0, 1, NumberLocale::Es, "0,0")]
    #[case(-960.0, 0, NumberLocale::Es, "-960")]
    #[case(-1_234_567.0, 0, NumberLocale::En, "-1,234,567")]
    #[case(-0.04, 1, NumberLocale::En, "0.0")] // No negative zero
    fn test_format_number(
        #[case] value: f64,
        #[case] decimals: usize,
        #[case] locale: NumberLocale,
        #[case] expected: &str,
    ) {
        assert_eq!(format_number(value, decimals, locale), expected);
    }

    #[rstest]
    #[case(63_000_000.0, NumberLocale::Es, "$63.000.000")]
    #[case(-960_000_000.0, NumberLocale::En, "-$960,000,000")]
    fn test_format_money(#[case] value: f64, #[case] locale: NumberLocale, #[case] expected: &str) {
        assert_eq!(format_money(value, locale), expected);
    }

    #[rstest]
    #[case(1688.0, NumberLocale::Es, "MM$1.688")]
    #[case(1688.0, NumberLocale::En, "$1,688M")]
    #[case(-960.0, NumberLocale::En, "-$960M")]
    fn test_format_millions(
        #[case] value: f64,
        #[case] locale: NumberLocale,
        #[case] expected: &str,
    ) {
        assert_eq!(format_millions(value, locale), expected);
    }

    #[rstest]
    #[case(40.0, NumberLocale::Es, "40%")]
    #[case(74.26, NumberLocale::Es, "74,3%")]
    #[case(74.26, NumberLocale::En, "74.3%")]
    fn test_format_percent(#[case] value: f64, #[case] locale: NumberLocale, #[case] expected: &str) {
        assert_eq!(format_percent(value, locale), expected);
    }

    #[test]
    fn test_format_payback() {
        assert_eq!(
            format_payback(Payback::Months(16), NumberLocale::Es),
            "16 meses"
        );
        assert_eq!(
            format_payback(Payback::NotAchievable, NumberLocale::En),
            "not achievable"
        );
    }
}
