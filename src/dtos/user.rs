//! User DTOs - Data Transfer Objects per utenti

use super::server_assigned::{ReadOnlyFields, ServerAssigned, UserComputed};
use crate::core::FieldErrors;
use crate::entities::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserDTO {
    pub id: i64,
    pub name: String,
    /// Shares the user belongs to
    pub shares: Vec<i64>,
    /// Expenses this user paid
    pub paid_by: Vec<i64>,
    /// Expenses this user holds a ratio in
    pub paid_for: Vec<i64>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            name: value.name,
            shares: Vec::new(), // da popolare con le relazioni
            paid_by: Vec::new(),
            paid_for: Vec::new(),
            created_at: value.timestamps.created_at,
            updated_at: value.timestamps.updated_at,
        }
    }
}

/// DTO per creare un nuovo utente (senza user_id)
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(length(min = 1, max = 64, message = "Name must be between 1 and 64 characters"))]
    pub name: String,

    /// Shares to join right away
    #[serde(default)]
    pub shares: Option<Vec<i64>>,

    #[serde(flatten)]
    pub server_assigned: ServerAssigned,

    #[serde(flatten)]
    pub computed: UserComputed,
}

/// DTO per aggiornare un utente: solo i campi presenti vengono modificati
#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUserDTO {
    #[validate(length(min = 1, max = 64, message = "Name must be between 1 and 64 characters"))]
    #[serde(default)]
    pub name: Option<String>,

    /// Replaces the whole set of shares; an empty list leaves every share
    #[serde(default)]
    pub shares: Option<Vec<i64>>,

    #[serde(flatten)]
    pub server_assigned: ServerAssigned,

    #[serde(flatten)]
    pub computed: UserComputed,
}

impl ReadOnlyFields for CreateUserDTO {
    fn violations(&self) -> FieldErrors {
        let mut violations = self.server_assigned.violations();
        violations.extend(self.computed.violations());
        violations
    }
}

impl ReadOnlyFields for UpdateUserDTO {
    fn violations(&self) -> FieldErrors {
        let mut violations = self.server_assigned.violations();
        violations.extend(self.computed.violations());
        violations
    }
}
