//! Fraction - Singola quota "numeratore/denominatore" di un partecipante

use super::error::ValidationError;
use super::roster::ShareRoster;
use num_bigint::BigInt;
use num_rational::BigRational;
use std::fmt;
use std::str::FromStr;

/// A positive fraction as written by the client, kept unreduced.
///
/// `2/4` is stored and rendered back as `2/4`; only the sum check reduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: u32,
    denominator: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FractionParseError {
    #[error("expected exactly one '/'")]
    Malformed,
    #[error("numerator and denominator must be positive integers")]
    NotPositive,
}

impl Fraction {
    /// Returns `None` when either part is zero
    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        (numerator > 0 && denominator > 0).then_some(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Exact value, used for the sum-to-one check
    pub fn to_rational(&self) -> BigRational {
        BigRational::new(BigInt::from(self.numerator), BigInt::from(self.denominator))
    }
}

fn positive_part(part: &str) -> Result<u32, FractionParseError> {
    match part.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(FractionParseError::NotPositive),
    }
}

impl FromStr for Fraction {
    type Err = FractionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split('/');
        let (Some(top), Some(bottom), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(FractionParseError::Malformed);
        };
        Ok(Self {
            numerator: positive_part(top)?,
            denominator: positive_part(bottom)?,
        })
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Validates one `participant -> "n/d"` entry against the share roster.
///
/// Checks run in order: participant exists, participant is a member,
/// ratio has one `/`, both parts are positive integers.
pub fn validate_entry(
    participant: &str,
    ratio: &str,
    roster: &ShareRoster,
) -> Result<(i64, Fraction), ValidationError> {
    let user_id = roster.resolve(participant)?;

    let fraction = ratio.parse::<Fraction>().map_err(|err| match err {
        FractionParseError::Malformed => ValidationError::MalformedRatio {
            participant: participant.to_string(),
            ratio: ratio.to_string(),
        },
        FractionParseError::NotPositive => ValidationError::InvalidRatioValue {
            participant: participant.to_string(),
            ratio: ratio.to_string(),
        },
    })?;

    Ok((user_id, fraction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> ShareRoster {
        // share 1 has users 1 and 2; user 3 exists outside of it
        ShareRoster::new([1, 2], [1, 2, 3])
    }

    #[test]
    fn parses_simple_fraction() {
        let fraction: Fraction = "1/2".parse().unwrap();
        assert_eq!((fraction.numerator(), fraction.denominator()), (1, 2));
        assert_eq!(fraction.to_string(), "1/2");
    }

    #[test]
    fn keeps_unreduced_form() {
        let fraction: Fraction = "2/4".parse().unwrap();
        assert_eq!(fraction.to_string(), "2/4");
        assert_eq!(fraction.to_rational(), "1/2".parse::<Fraction>().unwrap().to_rational());
    }

    #[test]
    fn tolerates_whitespace_around_parts() {
        let fraction: Fraction = " 3 / 7 ".parse().unwrap();
        assert_eq!(fraction, Fraction::new(3, 7).unwrap());
    }

    #[test]
    fn rejects_wrong_slash_count() {
        assert_eq!("1/2/3".parse::<Fraction>(), Err(FractionParseError::Malformed));
        assert_eq!("12".parse::<Fraction>(), Err(FractionParseError::Malformed));
        assert_eq!("".parse::<Fraction>(), Err(FractionParseError::Malformed));
    }

    #[test]
    fn rejects_non_positive_parts() {
        for raw in ["0/5", "5/0", "-1/2", "1/-2", "a/2", "1/b", "/2", "1.5/2"] {
            assert_eq!(
                raw.parse::<Fraction>(),
                Err(FractionParseError::NotPositive),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_parts_beyond_u32() {
        assert_eq!(
            "1/4294967296".parse::<Fraction>(),
            Err(FractionParseError::NotPositive)
        );
    }

    #[test]
    fn new_refuses_zero() {
        assert!(Fraction::new(0, 1).is_none());
        assert!(Fraction::new(1, 0).is_none());
    }

    #[test]
    fn validate_entry_resolves_member() {
        let (user_id, fraction) = validate_entry("2", "1/3", &roster()).unwrap();
        assert_eq!(user_id, 2);
        assert_eq!(fraction, Fraction::new(1, 3).unwrap());
    }

    #[test]
    fn validate_entry_reports_unknown_user() {
        assert_eq!(
            validate_entry("42", "1/1", &roster()),
            Err(ValidationError::ParticipantNotFound {
                participant: "42".into()
            })
        );
        assert_eq!(
            validate_entry("bob", "1/1", &roster()),
            Err(ValidationError::ParticipantNotFound {
                participant: "bob".into()
            })
        );
    }

    #[test]
    fn validate_entry_reports_outsider() {
        assert_eq!(
            validate_entry("3", "1/1", &roster()),
            Err(ValidationError::ParticipantNotInGroup { user_id: 3 })
        );
    }

    #[test]
    fn participant_is_checked_before_ratio() {
        // both the user and the ratio are wrong: the user wins
        assert!(matches!(
            validate_entry("42", "1/2/3", &roster()),
            Err(ValidationError::ParticipantNotFound { .. })
        ));
    }

    #[test]
    fn validate_entry_maps_parse_errors() {
        assert!(matches!(
            validate_entry("1", "1/2/3", &roster()),
            Err(ValidationError::MalformedRatio { .. })
        ));
        assert!(matches!(
            validate_entry("1", "0/5", &roster()),
            Err(ValidationError::InvalidRatioValue { .. })
        ));
    }
}
