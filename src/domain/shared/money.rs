use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

// ============================================================================
// Money Value Object
// ============================================================================
//
// Amount + currency tag. The currency is never chosen by the caller: it is
// derived from the magnitude of the amount when the value is built with
// `MoneyValue::of`. Arithmetic keeps amounts of different currencies apart.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Euro,
    Cent,
}

impl Currency {
    /// Classify an amount: anything from one unit up is euros, the rest cents
    pub fn for_amount(amount: Decimal) -> Self {
        if amount >= Decimal::ONE {
            Currency::Euro
        } else {
            Currency::Cent
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Euro => "€",
            Currency::Cent => "c",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Cannot combine amounts in different currencies: {left} and {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("Cannot sum an empty sequence of amounts")]
    EmptySequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoneyValue {
    value: Decimal,
    currency: Currency,
}

impl MoneyValue {
    pub fn of(value: Decimal) -> Self {
        Self {
            value,
            currency: Currency::for_amount(value),
        }
    }

    /// Copy of another amount, keeping its currency as is
    pub fn of_money(other: &MoneyValue) -> Self {
        Self {
            value: other.value,
            currency: other.currency,
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn price_tag(&self) -> String {
        format!("{}{}", self.currency, self.value)
    }

    pub fn try_add(&self, rhs: &MoneyValue) -> Result<MoneyValue, MoneyError> {
        if self.currency != rhs.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: rhs.currency,
            });
        }

        Ok(Self {
            value: self.value + rhs.value,
            currency: self.currency,
        })
    }
}

impl fmt::Display for MoneyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.price_tag())
    }
}

impl Mul<Decimal> for MoneyValue {
    type Output = MoneyValue;

    fn mul(self, rhs: Decimal) -> Self::Output {
        MoneyValue {
            value: self.value * rhs,
            currency: self.currency,
        }
    }
}

impl Mul<i32> for MoneyValue {
    type Output = MoneyValue;

    fn mul(self, rhs: i32) -> Self::Output {
        self * Decimal::from(rhs)
    }
}

impl Mul<MoneyValue> for Decimal {
    type Output = MoneyValue;

    fn mul(self, rhs: MoneyValue) -> Self::Output {
        rhs * self
    }
}

impl Mul<MoneyValue> for i32 {
    type Output = MoneyValue;

    fn mul(self, rhs: MoneyValue) -> Self::Output {
        rhs * self
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Sum of amounts without a seed: an empty sequence has no currency to
/// report, so it is an error just like a currency mismatch.
pub trait MoneySum: Iterator + Sized {
    fn sum_money(self) -> Result<MoneyValue, MoneyError>
    where
        Self: Iterator<Item = MoneyValue>,
    {
        let mut iter = self;
        let first = iter.next().ok_or(MoneyError::EmptySequence)?;
        iter.try_fold(first, |acc, next| acc.try_add(&next))
    }

    fn sum_money_by<F>(self, selector: F) -> Result<MoneyValue, MoneyError>
    where
        F: FnMut(Self::Item) -> MoneyValue,
    {
        let total = self.map(selector).sum_money()?;
        Ok(MoneyValue::of_money(&total))
    }
}

impl<I: Iterator> MoneySum for I {}
