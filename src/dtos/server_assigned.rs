//! Campi assegnati o calcolati dal server che il client non può inviare

use crate::core::{AppError, FieldErrors};
use serde::Deserialize;
use serde_json::Value;

/// Request payloads carrying keys the client is not allowed to write
pub trait ReadOnlyFields {
    /// One "read-only field." reason per offending key
    fn violations(&self) -> FieldErrors;

    fn reject_read_only(&self) -> Result<(), AppError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(violations))
        }
    }
}

fn flag(present: &[(&str, bool)]) -> FieldErrors {
    present
        .iter()
        .filter(|(_, present)| *present)
        .map(|(field, _)| (field.to_string(), "read-only field.".to_string()))
        .collect()
}

/// Collects server-owned keys a client may try to send along with a payload.
///
/// Flattened into request DTOs; any present key is rejected as read-only.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ServerAssigned {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub updated_at: Option<Value>,
}

impl ReadOnlyFields for ServerAssigned {
    fn violations(&self) -> FieldErrors {
        flag(&[
            ("id", self.id.is_some()),
            ("created_at", self.created_at.is_some()),
            ("updated_at", self.updated_at.is_some()),
        ])
    }
}

/// Values a share read shows but derives from its expenses
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ShareComputed {
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub expenses: Option<Value>,
}

impl ReadOnlyFields for ShareComputed {
    fn violations(&self) -> FieldErrors {
        flag(&[
            ("total", self.total.is_some()),
            ("expenses", self.expenses.is_some()),
        ])
    }
}

/// Expense links a user read shows, owned by the expenses themselves
#[derive(Deserialize, Debug, Default, Clone)]
pub struct UserComputed {
    #[serde(default)]
    pub paid_by: Option<Value>,
    #[serde(default)]
    pub paid_for: Option<Value>,
}

impl ReadOnlyFields for UserComputed {
    fn violations(&self) -> FieldErrors {
        flag(&[
            ("paid_by", self.paid_by.is_some()),
            ("paid_for", self.paid_for.is_some()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_keys_pass() {
        let fields: ShareComputed = serde_json::from_value(json!({})).unwrap();
        assert!(fields.reject_read_only().is_ok());
    }

    #[test]
    fn sent_keys_are_flagged() {
        let fields: UserComputed = serde_json::from_value(json!({ "paid_by": [] })).unwrap();
        let violations = fields.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations["paid_by"], "read-only field.");
    }
}
