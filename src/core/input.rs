//! Lenient numeric form input.
//!
//! Forms must stay usable while the user is typing, so bad input never fails
//! an update. It is kept apart from a confirmed zero instead: arithmetic sees
//! zero, submission sees an unconfirmed field.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A parsed numeric input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericInput {
    /// A confirmed number.
    Value(Decimal),
    /// Nothing usable typed yet (`""`, `"."`, `"-"`).
    Pending(String),
    /// Unparseable or out of range.
    Invalid(String),
}

impl NumericInput {
    /// Parse raw form text. Accepts surrounding whitespace and `,` thousands
    /// separators (`"1,250.50"`).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if matches!(trimmed, "" | "." | "-" | "+") {
            return Self::Pending(raw.to_string());
        }
        let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
        match Decimal::from_str(&cleaned) {
            Ok(value) => Self::Value(value.normalize()),
            Err(_) => Self::Invalid(raw.to_string()),
        }
    }

    /// Narrow to `min..=max`; values outside the range become `Invalid`.
    pub fn bounded(self, min: Decimal, max: Option<Decimal>) -> Self {
        match self {
            Self::Value(v) if v < min || max.is_some_and(|m| v > m) => {
                Self::Invalid(v.to_string())
            }
            other => other,
        }
    }

    /// The value arithmetic uses: the number, or zero.
    pub fn value_or_zero(&self) -> Decimal {
        match self {
            Self::Value(v) => *v,
            Self::Pending(_) | Self::Invalid(_) => Decimal::ZERO,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        Self::Value(value)
    }
}

impl From<u32> for NumericInput {
    fn from(value: u32) -> Self {
        Self::Value(Decimal::from(value))
    }
}
