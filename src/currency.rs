//! Formatting of monetary amounts in a user's preferred currency.

use std::fmt::Debug;

use numfmt::{Formatter, Precision};

use crate::Error;

/// The currencies the application can format, as (ISO 4217 code, symbol,
/// decimal places).
const SUPPORTED_CURRENCIES: [(&str, &str, usize); 8] = [
    ("USD", "$", 2),
    ("CAD", "$", 2),
    ("AUD", "$", 2),
    ("NZD", "$", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("INR", "₹", 2),
    ("JPY", "¥", 0),
];

/// The smallest magnitude numfmt renders in scientific notation.
const SCIENTIFIC_NOTATION_THRESHOLD: f64 = 1e12;

/// Formats amounts for one currency.
///
/// Built from a user's currency preference and passed to whatever needs to
/// display amounts, there is no global currency setting.
pub struct CurrencyFormat {
    code: &'static str,
    symbol: &'static str,
    decimals: usize,
    positive_fmt: Formatter,
    negative_fmt: Formatter,
}

impl CurrencyFormat {
    /// Create a formatter for the ISO 4217 currency `code`, e.g. "NZD".
    ///
    /// The code is matched case-insensitively.
    ///
    /// # Errors
    /// Returns [Error::UnknownCurrency] if `code` is not a supported currency.
    pub fn new(code: &str) -> Result<Self, Error> {
        let code = code.trim();

        let (code, symbol, decimals) = SUPPORTED_CURRENCIES
            .iter()
            .find(|(supported, _, _)| supported.eq_ignore_ascii_case(code))
            .copied()
            .ok_or_else(|| Error::UnknownCurrency(code.to_owned()))?;

        let build = |prefix: &str| {
            Formatter::currency(prefix)
                .map(|formatter| formatter.precision(Precision::Decimals(decimals as u8)))
                .map_err(|error| {
                    tracing::error!("could not create currency formatter for {code}: {error:?}");
                    Error::UnknownCurrency(code.to_owned())
                })
        };

        Ok(Self {
            code,
            symbol,
            decimals,
            positive_fmt: build(symbol)?,
            negative_fmt: build(&format!("-{symbol}"))?,
        })
    }

    /// The normalised ISO 4217 code, e.g. "NZD".
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Format `amount` with the currency symbol and a fixed number of decimal
    /// places, e.g. "$12.30" or "-€4.50".
    ///
    /// The amount is rounded to the currency's minor unit first, so sums with
    /// floating point error such as `0.1 + 0.2 - 0.3` format as zero.
    pub fn format(&self, amount: f64) -> String {
        let amount = self.round(amount);

        if amount == 0.0 {
            // Zero is hardcoded as "0", so we must specify the formatted string for zero
            return format!("{}{:.*}", self.symbol, self.decimals, 0.0);
        }

        // numfmt switches to scientific notation for large magnitudes.
        if !amount.is_finite() || amount.abs() >= SCIENTIFIC_NOTATION_THRESHOLD {
            let sign = if amount < 0.0 { "-" } else { "" };
            let digits = format!("{:.*}", self.decimals, amount.abs());
            return format!("{sign}{}{}", self.symbol, group_thousands(&digits));
        }

        let formatted = if amount < 0.0 {
            self.negative_fmt.fmt_string(amount.abs())
        } else {
            self.positive_fmt.fmt_string(amount)
        };

        pad_decimals(formatted, self.decimals)
    }

    fn round(&self, amount: f64) -> f64 {
        let scale = 10f64.powi(self.decimals as i32);

        (amount * scale).round() / scale
    }
}

impl Debug for CurrencyFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyFormat")
            .field("code", &self.code)
            .field("symbol", &self.symbol)
            .field("decimals", &self.decimals)
            .finish()
    }
}

// numfmt omits trailing zeros, so "12.30" is rendered as "12.3".
fn pad_decimals(formatted: String, decimals: usize) -> String {
    if decimals == 0 {
        return formatted;
    }

    match formatted.split_once('.') {
        Some((whole, fraction)) => format!("{whole}.{fraction:0<decimals$}"),
        None => format!("{formatted}.{}", "0".repeat(decimals)),
    }
}

// Inserts a comma between each group of three integer digits.
fn group_thousands(digits: &str) -> String {
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(digits.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use crate::{Error, currency::CurrencyFormat};

    #[test]
    fn formats_positive_amounts() {
        let format = CurrencyFormat::new("NZD").unwrap();

        assert_eq!(format.format(45.99), "$45.99");
        assert_eq!(format.format(12.3), "$12.30");
    }

    #[test]
    fn formats_negative_amounts() {
        let format = CurrencyFormat::new("EUR").unwrap();

        assert_eq!(format.format(-4.5), "-€4.50");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(CurrencyFormat::new("GBP").unwrap().format(0.0), "£0.00");
        assert_eq!(CurrencyFormat::new("JPY").unwrap().format(0.0), "¥0");
    }

    #[test]
    fn rounds_to_minor_unit() {
        let format = CurrencyFormat::new("USD").unwrap();

        assert_eq!(format.format(0.009), "$0.01");
        assert_eq!(format.format(12.345_6), "$12.35");
        assert_eq!(format.format(-0.004), "$0.00");
    }

    #[test]
    fn floating_point_error_formats_as_zero() {
        let format = CurrencyFormat::new("NZD").unwrap();
        let net = 0.1 + 0.2 - 0.3;
        assert_ne!(net, 0.0);

        assert_eq!(format.format(net), "$0.00");
    }

    #[test]
    fn large_amounts_are_not_scientific() {
        let format = CurrencyFormat::new("USD").unwrap();

        assert_eq!(format.format(1e12), "$1,000,000,000,000.00");
        assert_eq!(format.format(-2e15), "-$2,000,000,000,000,000.00");
        assert_eq!(CurrencyFormat::new("JPY").unwrap().format(1e15), "¥1,000,000,000,000,000");
    }

    #[test]
    fn non_finite_amounts_are_not_mangled() {
        let format = CurrencyFormat::new("USD").unwrap();

        assert_eq!(format.format(f64::INFINITY), "$inf");
        assert_eq!(format.format(f64::NEG_INFINITY), "-$inf");
    }

    #[test]
    fn formats_currency_without_minor_units() {
        let format = CurrencyFormat::new("JPY").unwrap();

        assert_eq!(format.format(500.0), "¥500");
    }

    #[test]
    fn code_is_case_insensitive() {
        let format = CurrencyFormat::new("usd").unwrap();

        assert_eq!(format.code(), "USD");
    }

    #[test]
    fn rejects_unknown_code() {
        let result = CurrencyFormat::new("XYZ");

        assert!(matches!(result, Err(Error::UnknownCurrency(code)) if code == "XYZ"));
    }
}
