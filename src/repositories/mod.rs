//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository gestisce le operazioni di database per una specifica entità.

// ************************* NOTA SU SQLX ************************* //

/*
   Le query usano le funzioni runtime (`sqlx::query`, `query_as`, `query_scalar`,
   `QueryBuilder`) e non le macro `query!`: la build non ha bisogno di un database
   acceso. La mappatura verso le entity passa da `#[derive(sqlx::FromRow)]`
   (oppure da un `FromRow` scritto a mano, vedi `Expense` e il suo `total`).

   Le operazioni che toccano più tabelle espongono una variante `*_in` che
   riceve `&mut SqliteConnection`: il chiamante apre la transazione
   (`pool.begin()`), passa `&mut *tx` e fa `commit()` alla fine. Se qualcosa
   fallisce prima del commit la transazione viene annullata al drop.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod expense;
pub mod expense_ratio;
pub mod membership;
pub mod share;
pub mod traits;
pub mod user;

#[cfg(test)]
mod fixtures;

pub use traits::{Create, Delete, Read, ReadMany, Update};

pub use expense::ExpenseRepository;
pub use expense_ratio::ExpenseRatioRepository;
pub use membership::MembershipRepository;
pub use share::ShareRepository;
pub use user::UserRepository;
