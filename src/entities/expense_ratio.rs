//! ExpenseRatio entity - Quota di un utente su una spesa

use crate::split::Fraction;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ExpenseRatio {
    pub ratio_id: i64,
    pub expense_id: i64,
    pub user_id: i64,
    pub numerator: u32,
    pub denominator: u32,
}

impl ExpenseRatio {
    /// `None` only if the row was written outside the ratio store
    pub fn fraction(&self) -> Option<Fraction> {
        Fraction::new(self.numerator, self.denominator)
    }

    /// Literal `"numerator/denominator"`, as clients read it back
    pub fn ratio_string(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }
}
