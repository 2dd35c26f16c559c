//! ShareRoster - Fotografia dei membri di uno share usata in validazione

use super::error::ValidationError;
use std::collections::HashSet;

/// Who belongs to a share, and which user ids exist at all.
///
/// Loaded from the store before validation so the validators stay pure.
#[derive(Debug, Clone, Default)]
pub struct ShareRoster {
    members: HashSet<i64>,
    known_users: HashSet<i64>,
}

impl ShareRoster {
    pub fn new(
        members: impl IntoIterator<Item = i64>,
        known_users: impl IntoIterator<Item = i64>,
    ) -> Self {
        let members: HashSet<i64> = members.into_iter().collect();
        // members exist by definition
        let known_users = known_users.into_iter().chain(members.iter().copied()).collect();
        Self {
            members,
            known_users,
        }
    }

    pub fn is_member(&self, user_id: i64) -> bool {
        self.members.contains(&user_id)
    }

    pub fn user_exists(&self, user_id: i64) -> bool {
        self.known_users.contains(&user_id)
    }

    /// Raw participant ids are natural numbers written as text
    pub fn parse_participant(raw: &str) -> Option<i64> {
        raw.trim().parse::<i64>().ok().filter(|id| *id >= 0)
    }

    /// Resolves a raw participant id to a member of this share
    pub fn resolve(&self, raw: &str) -> Result<i64, ValidationError> {
        let user_id = Self::parse_participant(raw)
            .filter(|id| self.user_exists(*id))
            .ok_or_else(|| ValidationError::ParticipantNotFound {
                participant: raw.to_string(),
            })?;

        if !self.is_member(user_id) {
            return Err(ValidationError::ParticipantNotInGroup { user_id });
        }
        Ok(user_id)
    }

    /// The payer must exist and belong to the share
    pub fn check_payer(&self, user_id: i64) -> Result<(), ValidationError> {
        if !self.user_exists(user_id) {
            return Err(ValidationError::PayerNotFound { user_id });
        }
        if !self.is_member(user_id) {
            return Err(ValidationError::PayerNotInGroup { user_id });
        }
        Ok(())
    }
}
