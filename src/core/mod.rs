//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! - Configurazione
//! - Pool di connessioni e migrazioni
//! - Gestione errori
//! - Stato applicazione

pub mod config;
pub mod db;
pub mod error;
pub mod state;

pub use config::Config;
pub use db::{DatabaseError, connect, connect_in_memory};
pub use error::{AppError, FieldErrors};
pub use state::AppState;
