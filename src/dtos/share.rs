//! Share DTOs - Data Transfer Objects per gli share

use super::server_assigned::{ReadOnlyFields, ServerAssigned, ShareComputed};
use crate::core::FieldErrors;
use crate::entities::Share;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShareDTO {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub users: Vec<i64>,
    pub expenses: Vec<i64>,
    /// Sum of the expense totals; a float only on the wire
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl From<Share> for ShareDTO {
    fn from(value: Share) -> Self {
        Self {
            id: value.share_id,
            name: value.name,
            description: value.description,
            users: Vec::new(), // da popolare con le relazioni
            expenses: Vec::new(),
            total: Decimal::ZERO,
            created_at: value.timestamps.created_at,
            updated_at: value.timestamps.updated_at,
        }
    }
}

/// DTO per creare un nuovo share (senza share_id)
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateShareDTO {
    #[validate(length(min = 1, max = 64, message = "Name must be between 1 and 64 characters"))]
    pub name: String,

    #[validate(length(max = 256, message = "Description must be at most 256 characters"))]
    pub description: String,

    #[serde(default)]
    pub users: Option<Vec<i64>>,

    #[serde(flatten)]
    pub server_assigned: ServerAssigned,

    #[serde(flatten)]
    pub computed: ShareComputed,
}

/// DTO per aggiornare uno share (solo campi modificabili)
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateShareDTO {
    #[validate(length(min = 1, max = 64, message = "Name must be between 1 and 64 characters"))]
    #[serde(default)]
    pub name: Option<String>,

    #[validate(length(max = 256, message = "Description must be at most 256 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    /// Replaces the member set; an empty list clears it
    #[serde(default)]
    pub users: Option<Vec<i64>>,

    #[serde(flatten)]
    pub server_assigned: ServerAssigned,

    #[serde(flatten)]
    pub computed: ShareComputed,
}

impl ReadOnlyFields for CreateShareDTO {
    fn violations(&self) -> FieldErrors {
        let mut violations = self.server_assigned.violations();
        violations.extend(self.computed.violations());
        violations
    }
}

impl ReadOnlyFields for UpdateShareDTO {
    fn violations(&self) -> FieldErrors {
        let mut violations = self.server_assigned.violations();
        violations.extend(self.computed.violations());
        violations
    }
}
