//! DTOs module - Data Transfer Objects
//!
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).
//! Timestamp come epoch Unix in secondi, importi come numeri in uscita.

pub mod expense;
pub mod query;
pub mod server_assigned;
pub mod share;
pub mod user;

pub use expense::{
    CreateExpenseDTO, CreateExpenseRequestDTO, ExpenseDTO, UpdateExpenseDTO,
    UpdateExpenseRequestDTO,
};
pub use query::{ExpenseListQuery, ListFilter, ListQuery};
pub use server_assigned::{ReadOnlyFields, ServerAssigned, ShareComputed, UserComputed};
pub use share::{CreateShareDTO, ShareDTO, UpdateShareDTO};
pub use user::{CreateUserDTO, UpdateUserDTO, UserDTO};
