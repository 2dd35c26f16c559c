//! Expense entity - Singola spesa di uno share

use super::timestamps::Timestamps;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;

/// Money column limits: 19 digits overall, 10 of them after the point
pub const MAX_DIGITS: u32 = 19;
pub const DECIMAL_PLACES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Ensure that there are no more than 10 decimal places.")]
    TooManyDecimalPlaces,
    #[error("Ensure that there are no more than 9 digits before the decimal point.")]
    TooManyWholeDigits,
}

/// Exact decimal amount that fits the money column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        let amount = amount.normalize();
        if amount.scale() > DECIMAL_PLACES {
            return Err(MoneyError::TooManyDecimalPlaces);
        }
        let digits = amount.mantissa().unsigned_abs().to_string().len() as u32;
        if digits.saturating_sub(amount.scale()) > MAX_DIGITS - DECIMAL_PLACES {
            return Err(MoneyError::TooManyWholeDigits);
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Expense {
    pub expense_id: i64,
    pub description: String,
    pub share_id: i64,
    pub total: Decimal,
    pub paid_by: i64,
    pub resolved: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

// total is stored as text, so the row is mapped by hand
impl<'r> FromRow<'r, SqliteRow> for Expense {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let raw_total: String = row.try_get("total")?;
        let total = Decimal::from_str(&raw_total).map_err(|e| sqlx::Error::ColumnDecode {
            index: "total".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            expense_id: row.try_get("expense_id")?,
            description: row.try_get("description")?,
            share_id: row.try_get("share_id")?,
            total,
            paid_by: row.try_get("paid_by")?,
            resolved: row.try_get("resolved")?,
            timestamps: Timestamps::from_row(row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    #[test]
    fn accepts_usual_amounts() {
        assert_eq!(Money::new(dec("10.00")).unwrap().amount(), dec("10"));
        assert!(Money::new(dec("-3.5")).is_ok());
        assert!(Money::new(dec("999999999.9999999999")).is_ok());
    }

    #[test]
    fn rejects_too_many_decimal_places() {
        assert_eq!(
            Money::new(dec("0.00000000001")),
            Err(MoneyError::TooManyDecimalPlaces)
        );
    }

    #[test]
    fn trailing_zeros_do_not_count() {
        assert!(Money::new(dec("1.100000000000")).is_ok());
    }

    #[test]
    fn rejects_too_many_whole_digits() {
        assert_eq!(
            Money::new(dec("1000000000")),
            Err(MoneyError::TooManyWholeDigits)
        );
    }
}
