//! Errori di validazione di un paid_for e del pagante

/// Client-input errors raised while validating an expense split.
///
/// All of them are detected before any row is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Ratio '{ratio}' for user '{participant}' must be in the form 'numerator/denominator'.")]
    MalformedRatio { participant: String, ratio: String },

    #[error("Ratio '{ratio}' for user '{participant}' must be made of positive integers.")]
    InvalidRatioValue { participant: String, ratio: String },

    #[error("User with ID '{participant}' not found.")]
    ParticipantNotFound { participant: String },

    #[error("User with ID {user_id} must be in the share.")]
    ParticipantNotInGroup { user_id: i64 },

    #[error("User with ID {user_id} is listed more than once.")]
    DuplicateParticipant { user_id: i64 },

    #[error("Paid by user with ID {user_id} must be in the share.")]
    PayerNotInGroup { user_id: i64 },

    #[error("Paid by user with ID {user_id} not found.")]
    PayerNotFound { user_id: i64 },

    #[error("Must be a dict.")]
    NotAMapping,

    #[error("Cannot be empty.")]
    EmptyRatioSet,

    #[error("Ratios must add up to 1, got {sum}.")]
    RatioSumMismatch { sum: String },
}

impl ValidationError {
    /// Request field the error is reported under
    pub fn field(&self) -> &'static str {
        match self {
            Self::PayerNotInGroup { .. } | Self::PayerNotFound { .. } => "paid_by",
            _ => "paid_for",
        }
    }
}
