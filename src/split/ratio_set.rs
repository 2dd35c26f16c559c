//! RatioSet - Validazione di un intero paid_for

use super::error::ValidationError;
use super::fraction::{Fraction, validate_entry};
use super::roster::ShareRoster;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde_json::Value;
use std::collections::BTreeMap;

/// A paid_for mapping whose fractions are well formed, belong to share
/// members and add up to exactly one.
///
/// Only [`validate_ratio_set`] builds it, so holding one means the checks ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioSet {
    entries: BTreeMap<i64, Fraction>,
}

impl RatioSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, user_id: i64) -> Option<Fraction> {
        self.entries.get(&user_id).copied()
    }

    /// Entries ordered by user id
    pub fn iter(&self) -> impl Iterator<Item = (i64, Fraction)> + '_ {
        self.entries.iter().map(|(user_id, fraction)| (*user_id, *fraction))
    }

    pub fn user_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.keys().copied()
    }
}

/// Exact sum of the fractions, reduced
pub fn exact_sum<'a>(fractions: impl IntoIterator<Item = &'a Fraction>) -> BigRational {
    fractions
        .into_iter()
        .fold(BigRational::zero(), |acc, fraction| acc + fraction.to_rational())
}

/// Reads a `paid_for` JSON value as participant -> ratio text.
///
/// Anything but an object is rejected; a ratio that is not a string is malformed.
pub fn ratio_entries(raw: &Value) -> Result<BTreeMap<String, String>, ValidationError> {
    let Value::Object(map) = raw else {
        return Err(ValidationError::NotAMapping);
    };
    map.iter()
        .map(|(participant, ratio)| match ratio {
            Value::String(text) => Ok((participant.clone(), text.clone())),
            other => Err(ValidationError::MalformedRatio {
                participant: participant.clone(),
                ratio: other.to_string(),
            }),
        })
        .collect()
}

/// Validates a whole participant -> "n/d" mapping.
///
/// Fails fast on the first bad entry (in key order), then checks the
/// exact rational sum equals one.
pub fn validate_ratio_set(
    paid_for: &BTreeMap<String, String>,
    roster: &ShareRoster,
) -> Result<RatioSet, ValidationError> {
    if paid_for.is_empty() {
        return Err(ValidationError::EmptyRatioSet);
    }

    let mut entries = BTreeMap::new();
    for (participant, ratio) in paid_for {
        let (user_id, fraction) = validate_entry(participant, ratio, roster)?;
        if entries.insert(user_id, fraction).is_some() {
            return Err(ValidationError::DuplicateParticipant { user_id });
        }
    }

    let sum = exact_sum(entries.values());
    if !sum.is_one() {
        return Err(ValidationError::RatioSumMismatch {
            sum: sum.to_string(),
        });
    }

    Ok(RatioSet { entries })
}
