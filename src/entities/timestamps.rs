//! Timestamps - Campi created_at / updated_at condivisi dalle entità

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Both fields set to the current instant
    pub fn now() -> Self {
        let now = now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current time truncated to microseconds, the precision kept by the store
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
