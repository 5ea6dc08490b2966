use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Unknown currency: '{0}'")]
    UnknownCurrency(String),
}

/// Three-letter ISO 4217 code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn from_code(code: &str) -> Result<Self, MoneyError> {
        let code = code.trim().to_ascii_uppercase();
        // Banks still print the pre-1998 rouble code.
        let code = match code.as_str() {
            "RUR" => "RUB".to_string(),
            _ => code,
        };
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Currency(code))
        } else {
            Err(MoneyError::UnknownCurrency(code))
        }
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::from_code(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Money { amount, currency }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Exact comparison. Amounts in different currencies are never equal.
    pub fn is_equal_to(&self, other: &Money) -> bool {
        self.currency == other.currency && self.amount == other.amount
    }

    /// Relative comparison: accepts when the difference is strictly below
    /// `tolerance_percent` of the larger magnitude. Requires the same currency.
    pub fn is_nearly_equal(&self, other: &Money, tolerance_percent: Decimal) -> bool {
        if self.currency != other.currency {
            return false;
        }
        let a = self.amount.abs();
        let b = other.amount.abs();
        let biggest = a.max(b);
        if biggest.is_zero() {
            return true;
        }
        let diff_percent = (self.amount - other.amount).abs() / biggest * Decimal::ONE_HUNDRED;
        diff_percent < tolerance_percent
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}
