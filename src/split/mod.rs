//! Split Module - Validazione delle quote di una spesa
//!
//! - [`fraction`]: una singola voce `"n/d"`
//! - [`ratio_set`]: l'intero paid_for, somma esatta uguale a 1
//! - [`roster`]: membri dello share e utenti esistenti, caricati prima della validazione

pub mod error;
pub mod fraction;
pub mod ratio_set;
pub mod roster;

pub use error::ValidationError;
pub use fraction::{Fraction, FractionParseError, validate_entry};
pub use ratio_set::{RatioSet, exact_sum, ratio_entries, validate_ratio_set};
pub use roster::ShareRoster;
