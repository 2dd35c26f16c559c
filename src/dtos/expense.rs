//! Expense DTOs - Data Transfer Objects per le spese

use super::server_assigned::ServerAssigned;
use crate::entities::{Expense, ExpenseRatio, Money};
use crate::split::RatioSet;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExpenseDTO {
    pub id: i64,
    pub description: String,
    pub share: i64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
    pub paid_by: i64,
    /// user id -> literal "numerator/denominator"
    pub paid_for: BTreeMap<i64, String>,
    pub resolved: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl ExpenseDTO {
    pub fn new(expense: Expense, ratios: &[ExpenseRatio]) -> Self {
        Self {
            id: expense.expense_id,
            description: expense.description,
            share: expense.share_id,
            total: expense.total,
            paid_by: expense.paid_by,
            paid_for: ratios
                .iter()
                .map(|ratio| (ratio.user_id, ratio.ratio_string()))
                .collect(),
            resolved: expense.resolved,
            created_at: expense.timestamps.created_at,
            updated_at: expense.timestamps.updated_at,
        }
    }
}

/// Payload of `POST /expenses`, still unvalidated
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateExpenseRequestDTO {
    #[validate(length(max = 256, message = "Description must be at most 256 characters"))]
    pub description: String,

    pub share: i64,

    /// Number or string; kept exact
    pub total: Decimal,

    pub paid_by: i64,

    /// participant id -> "numerator/denominator"; shape checked by the service
    pub paid_for: Value,

    #[serde(default)]
    pub resolved: Option<bool>,

    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub server_assigned: ServerAssigned,
}

/// Payload of `PATCH /expenses/{id}`: every field optional
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateExpenseRequestDTO {
    #[validate(length(max = 256, message = "Description must be at most 256 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub share: Option<i64>,

    #[serde(default)]
    pub total: Option<Decimal>,

    #[serde(default)]
    pub paid_by: Option<i64>,

    #[serde(default)]
    pub paid_for: Option<Value>,

    #[serde(default)]
    pub resolved: Option<bool>,

    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub server_assigned: ServerAssigned,
}

/// Validated data handed to the repository to insert an expense and its ratios
#[derive(Debug, Clone)]
pub struct CreateExpenseDTO {
    pub description: String,
    pub share_id: i64,
    pub total: Money,
    pub paid_by: i64,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub paid_for: RatioSet,
}

/// Validated partial update; `paid_for` replaces every ratio when present
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseDTO {
    pub description: Option<String>,
    pub share_id: Option<i64>,
    pub total: Option<Money>,
    pub paid_by: Option<i64>,
    pub resolved: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub paid_for: Option<RatioSet>,
}
