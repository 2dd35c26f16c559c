//! Shared expenses library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod split;

// Re-export dei tipi principali per facilitare l'import
pub use self::core::{AppError, AppState, config};
pub use services::root;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/users", configure_user_routes())
        .nest("/shares", configure_share_routes())
        .nest("/expenses", configure_expense_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Configura le routes per la gestione degli utenti
fn configure_user_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{user_id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

/// Configura le routes degli share e dei loro membri
fn configure_share_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/", get(list_shares).post(create_share))
        .route(
            "/{share_id}",
            get(get_share).patch(update_share).delete(delete_share),
        )
        .route(
            "/{share_id}/members/{user_id}",
            post(add_member).delete(remove_member),
        )
}

/// Configura le routes per la gestione delle spese
fn configure_expense_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route(
            "/{expense_id}",
            get(get_expense).patch(update_expense).delete(delete_expense),
        )
}
