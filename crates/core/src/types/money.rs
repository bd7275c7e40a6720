//! Ringgit amounts using decimal arithmetic.
//!
//! The agency prices and reports everything in Malaysian Ringgit, so `Money`
//! carries no currency code. Amounts are never negative.

use core::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input could not be parsed as a decimal number.
    #[error("'{0}' is not a number")]
    Invalid(String),
    /// The amount is below zero.
    #[error("amount must not be negative")]
    Negative,
}

/// A non-negative Ringgit (RM) amount.
///
/// ```
/// use mahardika_core::Money;
///
/// let price = Money::parse("1200").unwrap();
/// assert_eq!(price.to_string(), "RM 1,200.00");
/// assert!(Money::parse("-5").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero ringgit.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a money value from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount))
    }

    /// Create a money value from a whole number of sen (hundredths).
    #[must_use]
    pub fn from_sen(sen: u64) -> Self {
        Self(Decimal::from(sen) / Decimal::ONE_HUNDRED)
    }

    /// Parse user input such as `"1200"`, `"450.00"` or `"RM 1,350.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Invalid`] for non-numeric input and
    /// [`MoneyError::Negative`] for amounts below zero.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches("RM")
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        let amount =
            Decimal::from_str(&cleaned).map_err(|_| MoneyError::Invalid(input.trim().to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format the amount with two decimals and thousands separators, without the
    /// currency prefix (`"28,500.50"`).
    #[must_use]
    pub fn format_amount(&self) -> String {
        let rounded = self.0.round_dp(2);
        let text = format!("{rounded:.2}");
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        format!("{}.{fraction}", group_thousands(whole))
    }
}

/// Insert `,` every three digits from the right of an unsigned digit string.
#[must_use]
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RM {}", self.format_amount())
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
