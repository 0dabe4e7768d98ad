//! Render-time currency conversion for the storefront.
//!
//! Canonical prices are stored and transmitted in one base currency (CNY);
//! the UI language selects a display currency and conversion happens only
//! at render time. Exchange rates are fixed constants anchored at
//! CNY = 1.0; there is no refresh mechanism.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display currencies supported by the storefront.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Cny,
    Hkd,
    Usd,
}

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cny => "CNY",
            Self::Hkd => "HKD",
            Self::Usd => "USD",
        }
    }

    /// Symbol prefixed to formatted amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Cny => "¥",
            Self::Hkd => "HK$",
            Self::Usd => "$",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cny => "Chinese Yuan",
            Self::Hkd => "Hong Kong Dollar",
            Self::Usd => "US Dollar",
        }
    }

    /// Units of this currency per one unit of the base currency (CNY).
    fn rate(&self) -> Decimal {
        match self {
            Self::Cny => Decimal::ONE,
            Self::Hkd => dec!(1.09),
            Self::Usd => dec!(0.14),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CNY" => Ok(Self::Cny),
            "HKD" => Ok(Self::Hkd),
            "USD" => Ok(Self::Usd),
            other => Err(format!("unsupported currency code: {other}")),
        }
    }
}

/// Maps a UI language tag to its display currency.
///
/// Total function: unrecognized languages fall back to USD.
pub fn currency_for_language(language: &str) -> CurrencyCode {
    match language {
        "zh" | "zh-CN" => CurrencyCode::Cny,
        "zh-TW" | "zh-HK" => CurrencyCode::Hkd,
        lang if lang == "en" || lang.starts_with("en-") => CurrencyCode::Usd,
        _ => CurrencyCode::Usd,
    }
}

/// Converts an amount between display currencies against the fixed table.
///
/// Identity when `from == to`; otherwise the result is rounded to two
/// decimal places with standard (midpoint-away-from-zero) rounding.
pub fn convert(amount: Decimal, from: CurrencyCode, to: CurrencyCode) -> Decimal {
    if from == to {
        return amount;
    }
    (amount / from.rate() * to.rate())
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders an amount with the currency symbol, digit grouping, and two
/// fixed decimal digits, e.g. `¥1,280.00`.
pub fn format(amount: Decimal, currency: CurrencyCode) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    format!(
        "{}{}{}.{}",
        sign,
        currency.symbol(),
        group_thousands(int_part),
        frac_part
    )
}

/// A price as shown to the user: converted amount, display currency, and
/// the formatted string. Derived at render time, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPrice {
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub formatted: String,
}

/// The composite entry point used by the presentation layer: pick the
/// currency for the language, convert from the base currency, format.
pub fn display_price(
    base_price: Decimal,
    base_currency: CurrencyCode,
    language: &str,
) -> DisplayPrice {
    let currency = currency_for_language(language);
    let amount = convert(base_price, base_currency, currency);
    DisplayPrice {
        amount,
        currency,
        formatted: format(amount, currency),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
