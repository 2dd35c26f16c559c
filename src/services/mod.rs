//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Ogni sotto-modulo gestisce gli endpoint HTTP di una risorsa.

pub mod expense;
pub mod share;
pub mod user;

// Re-exports per facilitare l'import
pub use expense::{create_expense, delete_expense, get_expense, list_expenses, update_expense};
pub use share::{
    add_member, create_share, delete_share, get_share, list_shares, remove_member, update_share,
};
pub use user::{create_user, delete_user, get_user, list_users, update_user};

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
