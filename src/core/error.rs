use crate::split::ValidationError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

/// Field name -> human readable reason
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
    fields: Option<FieldErrors>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
            fields: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attaches a reason to a request field, merging with fields already set
    pub fn with_field(mut self, field: impl Into<String>, reason: impl Into<String>) -> Self {
        self.fields
            .get_or_insert_with(FieldErrors::new)
            .insert(field.into(), reason.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn fields(&self) -> Option<&FieldErrors> {
        self.fields.as_ref()
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// 400 carrying one reason per offending field
    pub fn validation(fields: FieldErrors) -> Self {
        Self {
            fields: Some(fields),
            ..Self::bad_request("Validation error")
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),

            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::conflict("Resource already exists").with_details(db_err.message())
            }

            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::conflict("Resource is still referenced").with_details(db_err.message())
            }

            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                Self::bad_request("Database error").with_details(db_err.message())
            }

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::service_unavailable("Database unavailable")
            }

            other => {
                error!("Unhandled database error: {other}");
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request("Validation error").with_field(err.field(), err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let reason = errors
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "Invalid value.".to_string());
                (field.to_string(), reason)
            })
            .collect();
        Self::validation(fields)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_errors_are_keyed_by_field() {
        let err = AppError::from(ValidationError::EmptyRatioSet);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.fields().and_then(|f| f.get("paid_for")).map(String::as_str),
            Some("Cannot be empty.")
        );
    }

    #[test]
    fn payer_errors_use_paid_by_field() {
        let err = AppError::from(ValidationError::PayerNotInGroup { user_id: 4 });
        assert!(err.fields().is_some_and(|f| f.contains_key("paid_by")));
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
