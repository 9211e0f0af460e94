use std::{fmt::Display, str::FromStr};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// How strongly an observation indicates local breeding.
///
/// Decoded from the BirdTrack numeric breeding code, 0 to 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum BreedingEvidence {
    /// No breeding code was entered.
    #[strum(to_string = "Unknown")]
    Unknown,
    /// Code 0, the bird was seen but not in a breeding context.
    #[strum(to_string = "Non-breeding")]
    NonBreeding,
    /// Codes 1 and 2.
    #[strum(to_string = "Possible breeder")]
    PossibleBreeder,
    /// Codes 3 to 9.
    #[strum(to_string = "Probable breeding")]
    ProbableBreeding,
    /// Codes 10 to 16.
    #[strum(to_string = "Confirmed breeding")]
    ConfirmedBreeding,
    /// A code outside 0 to 16, or text that is not a code at all.
    #[strum(to_string = "Invalid")]
    Invalid,
}

impl BreedingEvidence {
    /// The tiers that count as breeding evidence in a species rollup, weakest first.
    pub const BREEDING_TIERS: [BreedingEvidence; 3] = [
        BreedingEvidence::PossibleBreeder,
        BreedingEvidence::ProbableBreeding,
        BreedingEvidence::ConfirmedBreeding,
    ];

    /// Decode a BirdTrack breeding code.
    pub fn decode(code: Option<i64>) -> Self {
        use BreedingEvidence::*;

        match code {
            None => Unknown,
            Some(0) => NonBreeding,
            Some(b) if 0 < b && b < 3 => PossibleBreeder,
            Some(b) if 2 < b && b < 10 => ProbableBreeding,
            Some(b) if 9 < b && b < 17 => ConfirmedBreeding,
            Some(_) => Invalid,
        }
    }

    /// Decode a breeding code cell as it appears in an export.
    ///
    /// Empty cells are `Unknown`. Codes may be zero padded (`02`) or carry a spreadsheet float
    /// suffix (`2.0`). A cell already holding a tier label is taken as that tier. Anything else
    /// is `Invalid`.
    pub fn from_code_str(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return BreedingEvidence::Unknown;
        }

        if let Ok(code) = text.parse::<i64>() {
            return Self::decode(Some(code));
        }

        if let Ok(code) = text.parse::<f64>() {
            if code.is_finite() && code.fract() == 0.0 {
                return Self::decode(Some(code as i64));
            }
            return BreedingEvidence::Invalid;
        }

        BreedingEvidence::from_str(text).unwrap_or(BreedingEvidence::Invalid)
    }

    /// Parse the numeric code out of a cell, if it holds a valid one.
    pub fn code_from_str(text: &str) -> Option<u8> {
        let text = text.trim();
        let code = text
            .parse::<i64>()
            .ok()
            .or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|c| c.is_finite() && c.fract() == 0.0)
                    .map(|c| c as i64)
            })?;

        if (0..=16).contains(&code) {
            Some(code as u8)
        } else {
            None
        }
    }

    /// Confidence rank, 0 for non-breeding up to 3 for confirmed. `None` for `Unknown` and
    /// `Invalid`, which carry no information about breeding.
    pub fn confidence(self) -> Option<u8> {
        use BreedingEvidence::*;

        match self {
            NonBreeding => Some(0),
            PossibleBreeder => Some(1),
            ProbableBreeding => Some(2),
            ConfirmedBreeding => Some(3),
            Unknown | Invalid => None,
        }
    }

    /// True for possible, probable and confirmed breeding.
    pub fn is_breeding_tier(self) -> bool {
        Self::BREEDING_TIERS.contains(&self)
    }

    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }
}

impl Default for BreedingEvidence {
    fn default() -> Self {
        BreedingEvidence::Unknown
    }
}

impl Display for BreedingEvidence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.as_static_str())
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use strum::IntoEnumIterator;

    #[test]
    fn test_decode_tier_boundaries() {
        use BreedingEvidence::*;

        assert_eq!(BreedingEvidence::decode(None), Unknown);
        assert_eq!(BreedingEvidence::decode(Some(0)), NonBreeding);
        assert_eq!(BreedingEvidence::decode(Some(1)), PossibleBreeder);
        assert_eq!(BreedingEvidence::decode(Some(2)), PossibleBreeder);
        assert_eq!(BreedingEvidence::decode(Some(3)), ProbableBreeding);
        assert_eq!(BreedingEvidence::decode(Some(9)), ProbableBreeding);
        assert_eq!(BreedingEvidence::decode(Some(10)), ConfirmedBreeding);
        assert_eq!(BreedingEvidence::decode(Some(16)), ConfirmedBreeding);
        assert_eq!(BreedingEvidence::decode(Some(17)), Invalid);
        assert_eq!(BreedingEvidence::decode(Some(-1)), Invalid);
    }

    #[test]
    fn test_decode_is_monotonic() {
        let mut last = 0;
        for code in 0..=16 {
            let confidence = BreedingEvidence::decode(Some(code))
                .confidence()
                .expect("valid codes always have a confidence");
            assert!(confidence >= last, "confidence dropped at code {}", code);
            last = confidence;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_from_code_str() {
        use BreedingEvidence::*;

        assert_eq!(BreedingEvidence::from_code_str(""), Unknown);
        assert_eq!(BreedingEvidence::from_code_str("  "), Unknown);
        assert_eq!(BreedingEvidence::from_code_str("02"), PossibleBreeder);
        assert_eq!(BreedingEvidence::from_code_str("12.0"), ConfirmedBreeding);
        assert_eq!(BreedingEvidence::from_code_str("2.5"), Invalid);
        assert_eq!(BreedingEvidence::from_code_str("FL"), Invalid);
        assert_eq!(BreedingEvidence::from_code_str("Probable breeding"), ProbableBreeding);
    }

    #[test]
    fn test_code_from_str() {
        assert_eq!(BreedingEvidence::code_from_str("02"), Some(2));
        assert_eq!(BreedingEvidence::code_from_str("16.0"), Some(16));
        assert_eq!(BreedingEvidence::code_from_str("17"), None);
        assert_eq!(BreedingEvidence::code_from_str(""), None);
    }

    #[test]
    fn round_trip_strings_for_breeding_evidence() {
        for tier in BreedingEvidence::iter() {
            assert_eq!(BreedingEvidence::from_str(tier.as_static_str()).unwrap(), tier);
        }
    }
}
