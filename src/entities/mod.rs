//! Entities module - Entità del dominio applicativo
//!
//! Ogni entity corrisponde a una tabella nel database.

pub mod expense;
pub mod expense_ratio;
pub mod share;
pub mod timestamps;
pub mod user;

pub use expense::{Expense, Money, MoneyError};
pub use expense_ratio::ExpenseRatio;
pub use share::Share;
pub use timestamps::Timestamps;
pub use user::User;
