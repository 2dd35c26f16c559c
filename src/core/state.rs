//! Application State - Stato globale dell'applicazione
//!
//! Raccoglie i repository condivisi tra tutte le route.

use crate::repositories::{
    ExpenseRatioRepository, ExpenseRepository, MembershipRepository, ShareRepository,
    UserRepository,
};
use sqlx::SqlitePool;

pub struct AppState {
    /// Users
    pub user: UserRepository,

    /// Shares (groups)
    pub share: ShareRepository,

    /// share <-> user join table
    pub members: MembershipRepository,

    pub expense: ExpenseRepository,

    /// Ratio store: the only path that writes expense ratios
    pub ratios: ExpenseRatioRepository,
}

impl AppState {
    /// Builds every repository on top of the same connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            share: ShareRepository::new(pool.clone()),
            members: MembershipRepository::new(pool.clone()),
            expense: ExpenseRepository::new(pool.clone()),
            ratios: ExpenseRatioRepository::new(pool),
        }
    }
}
