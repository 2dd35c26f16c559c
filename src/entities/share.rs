//! Share entity - Gruppo di utenti che si dividono le spese
//!
//! I membri non sono un campo: vivono nella tabella `share_members`.

use super::timestamps::Timestamps;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Share {
    pub share_id: i64,
    pub name: String,
    pub description: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
}
