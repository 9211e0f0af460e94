use crate::errors::BirdRecordsErr;
use std::{fmt::Display, str::FromStr};

/// How a count was qualified when it was entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CountQualifier {
    /// A plain number, e.g. `12`.
    Exact,
    /// A lower bound, e.g. `200+`.
    AtLeast,
    /// A circa count, e.g. `c50`.
    Approximate,
    /// The bird was present but not counted, entered as `Present` or left empty.
    Present,
}

/// A count resolved to an integer, remembering the qualifier it was entered with.
///
/// Only the value takes part in sums; the qualifier is kept so the count can be written back out
/// the way a recorder would expect to read it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Count {
    value: u64,
    qualifier: CountQualifier,
}

impl Count {
    /// Create a count with no qualifier.
    pub const fn exact(value: u64) -> Self {
        Count {
            value,
            qualifier: CountQualifier::Exact,
        }
    }

    /// Create a count with a qualifier.
    pub const fn new(value: u64, qualifier: CountQualifier) -> Self {
        Count { value, qualifier }
    }

    /// The value used when summing counts.
    pub fn value(self) -> u64 {
        self.value
    }

    /// The qualifier the count was entered with.
    pub fn qualifier(self) -> CountQualifier {
        self.qualifier
    }
}

impl FromStr for Count {
    type Err = BirdRecordsErr;

    fn from_str(entered: &str) -> Result<Self, Self::Err> {
        let compact: String = entered.chars().filter(|c| !c.is_whitespace()).collect();
        let mut remaining = compact.as_str();
        let mut qualifier = CountQualifier::Exact;

        if let Some(rest) = remaining.strip_suffix('+') {
            remaining = rest;
            qualifier = CountQualifier::AtLeast;
        }

        if let Some(rest) = remaining.strip_prefix('c') {
            remaining = rest;
            // A lower bound says more than a circa, so "c50+" stays AtLeast.
            if qualifier == CountQualifier::Exact {
                qualifier = CountQualifier::Approximate;
            }
        }

        if remaining.is_empty() || remaining.eq_ignore_ascii_case("present") {
            return Ok(Count::new(1, CountQualifier::Present));
        }

        if !remaining.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BirdRecordsErr::MalformedCount(entered.to_owned()));
        }

        let value = remaining
            .parse::<u64>()
            .map_err(|_| BirdRecordsErr::MalformedCount(entered.to_owned()))?;

        Ok(Count::new(value, qualifier))
    }
}

impl Display for Count {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self.qualifier {
            CountQualifier::Exact => write!(f, "{}", self.value),
            CountQualifier::AtLeast => write!(f, "{}+", self.value),
            CountQualifier::Approximate => write!(f, "c{}", self.value),
            CountQualifier::Present => write!(f, "Present"),
        }
    }
}

/// Resolve a count as entered by a recorder to the number used in sums.
pub fn parse_count(entered: &str) -> Result<u64, BirdRecordsErr> {
    Count::from_str(entered).map(Count::value)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_parse_count_documented_examples() {
        assert_eq!(parse_count("12").unwrap(), 12);
        assert_eq!(parse_count("c50").unwrap(), 50);
        assert_eq!(parse_count("12+").unwrap(), 12);
        assert_eq!(parse_count("Present").unwrap(), 1);
        assert_eq!(parse_count("PRESENT").unwrap(), 1);
        assert_eq!(parse_count("").unwrap(), 1);
        assert_eq!(parse_count("   ").unwrap(), 1);
        assert_eq!(parse_count(" 1 200 ").unwrap(), 1200);
        assert_eq!(parse_count("c 30 +").unwrap(), 30);
        assert_eq!(parse_count("99999999999").unwrap(), 99_999_999_999);
    }

    #[test]
    fn test_parse_count_keeps_qualifier() {
        assert_eq!(
            Count::from_str("c50").unwrap().qualifier(),
            CountQualifier::Approximate
        );
        assert_eq!(
            Count::from_str("200+").unwrap().qualifier(),
            CountQualifier::AtLeast
        );
        assert_eq!(
            Count::from_str("c50+").unwrap().qualifier(),
            CountQualifier::AtLeast
        );
        assert_eq!(
            Count::from_str("7").unwrap().qualifier(),
            CountQualifier::Exact
        );
        assert_eq!(
            Count::from_str("").unwrap().qualifier(),
            CountQualifier::Present
        );
    }

    #[test]
    fn test_parse_count_strips_only_one_qualifier_character() {
        assert!(parse_count("12++").is_err());
        assert!(parse_count("cc12").is_err());
    }

    #[test]
    fn test_parse_count_rejects_outside_grammar() {
        for bad in &["many", "~30 birds", "-3", "C50", "1.5", "+5", "99999999999999999999"] {
            match parse_count(bad) {
                Err(BirdRecordsErr::MalformedCount(val)) => assert_eq!(&val, bad),
                other => panic!("expected MalformedCount for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_display_uses_entered_form() {
        assert_eq!(Count::from_str("c50").unwrap().to_string(), "c50");
        assert_eq!(Count::from_str("12 +").unwrap().to_string(), "12+");
        assert_eq!(Count::from_str("9").unwrap().to_string(), "9");
        assert_eq!(Count::from_str("present").unwrap().to_string(), "Present");
    }
}
