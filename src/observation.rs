//! A single reported sighting and the fields derived from it.

use crate::errors::BirdRecordsErr;
use chrono::{NaiveDate, NaiveDateTime};
use std::{borrow::Cow, fmt::Display};

mod breeding;
mod count;
mod grid_ref;
mod season;

pub use self::breeding::BreedingEvidence;
pub use self::count::{parse_count, Count, CountQualifier};
pub use self::grid_ref::one_km_square;
pub use self::season::Season;

/// One reported sighting.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Common name, canonical once normalized.
    pub species: String,
    /// Scientific name, if the export carries one.
    pub scientific_name: Option<String>,
    /// Place label. The same site may appear under several labels.
    pub place: String,
    /// Observer name.
    pub observer: String,
    /// The day of the sighting.
    pub date: NaiveDate,
    /// The resolved count, `None` when the entered count could not be parsed.
    pub count: Option<Count>,
    /// The count as it was entered.
    pub count_text: String,
    /// The 1km grid square.
    pub grid_square: Option<String>,
    /// Decoded breeding evidence.
    pub breeding: BreedingEvidence,
    /// The BirdTrack breeding code, when a valid one was entered.
    pub breeding_code: Option<u8>,
    /// Identifies the row this came from. Only used to tell duplicates apart, never written out.
    pub source_id: Option<String>,
    /// Free text. Reconciliation may append to it.
    pub comment: String,
    /// Other named fields carried through unchanged, in output order.
    pub extra: Vec<(String, String)>,
}

/// The fields that identify a real-world sighting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservationKey {
    /// Species
    pub species: String,
    /// Place label
    pub place: String,
    /// Date of the sighting
    pub date: NaiveDate,
    /// Observer
    pub observer: String,
}

impl Display for ObservationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{} at {} on {} by {}",
            self.species,
            self.place,
            self.date.format(DATE_FORMAT),
            self.observer
        )
    }
}

/// Format used when writing dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

impl Observation {
    /// Create an observation with an exact count of one and everything optional left empty.
    pub fn new<S, P, O>(species: S, place: P, observer: O, date: NaiveDate) -> Self
    where
        S: Into<String>,
        P: Into<String>,
        O: Into<String>,
    {
        Observation {
            species: species.into(),
            scientific_name: None,
            place: place.into(),
            observer: observer.into(),
            date,
            count: Some(Count::exact(1)),
            count_text: "1".to_owned(),
            grid_square: None,
            breeding: BreedingEvidence::Unknown,
            breeding_code: None,
            source_id: None,
            comment: String::new(),
            extra: vec![],
        }
    }

    /// Replace the count, keeping the entered text in step.
    pub fn with_count(self, count: Count) -> Self {
        Observation {
            count: Some(count),
            count_text: count.to_string(),
            ..self
        }
    }

    /// Set the comment.
    pub fn with_comment<T: Into<String>>(self, comment: T) -> Self {
        Observation {
            comment: comment.into(),
            ..self
        }
    }

    /// Set the source id.
    pub fn with_source_id<T: Into<String>>(self, source_id: T) -> Self {
        Observation {
            source_id: Some(source_id.into()),
            ..self
        }
    }

    /// Set the grid square.
    pub fn with_grid_square<T: Into<String>>(self, grid_square: T) -> Self {
        Observation {
            grid_square: Some(grid_square.into()),
            ..self
        }
    }

    /// Set the breeding code and the evidence decoded from it.
    pub fn with_breeding_code(self, code: u8) -> Self {
        Observation {
            breeding_code: Some(code),
            breeding: BreedingEvidence::decode(Some(i64::from(code))),
            ..self
        }
    }

    /// The key used to detect duplicate reports of one sighting.
    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            species: self.species.clone(),
            place: self.place.clone(),
            date: self.date,
            observer: self.observer.clone(),
        }
    }

    /// The count used in sums, if it could be resolved.
    pub fn resolved_count(&self) -> Option<u64> {
        self.count.map(Count::value)
    }

    /// The count the way it should be shown to a reader.
    pub fn count_display(&self) -> Cow<str> {
        match self.count {
            Some(count) => Cow::Owned(count.to_string()),
            None => Cow::Borrowed(&self.count_text),
        }
    }

    /// The report season of the sighting.
    pub fn season(&self) -> Season {
        Season::for_date(self.date)
    }

    /// Look up a carried through field by name.
    pub fn extra(&self, name: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, val)| val.as_str())
    }
}

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d %b %Y"];

const DATE_TIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a date cell from an export. Day first formats are tried before ISO, and a time of day is
/// accepted and discarded.
pub fn parse_date(text: &str) -> Result<NaiveDate, BirdRecordsErr> {
    let text = text.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|date_time| date_time.date())
        })
        .ok_or_else(|| BirdRecordsErr::MalformedDate(text.to_owned()))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("05/06/2024").unwrap(), date(2024, 6, 5));
        assert_eq!(parse_date("2024-06-05").unwrap(), date(2024, 6, 5));
        assert_eq!(parse_date("05-06-2024").unwrap(), date(2024, 6, 5));
        assert_eq!(parse_date("05 Jun 2024").unwrap(), date(2024, 6, 5));
        assert_eq!(parse_date(" 05/06/2024 07:45 ").unwrap(), date(2024, 6, 5));
        assert_eq!(parse_date("2024-06-05 07:45:00").unwrap(), date(2024, 6, 5));
        assert!(parse_date("31/02/2024").is_err());
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_key_and_display() {
        let obs = Observation::new("Robin", "Garden", "Alice", date(2024, 5, 1));
        let key = obs.key();
        assert_eq!(key.species, "Robin");
        assert_eq!(key.to_string(), "Robin at Garden on 01/05/2024 by Alice");
    }

    #[test]
    fn test_count_display_falls_back_to_entered_text() {
        let mut obs = Observation::new("Robin", "Garden", "Alice", date(2024, 5, 1));
        assert_eq!(obs.count_display(), "1");

        obs.count = None;
        obs.count_text = "lots".to_owned();
        assert_eq!(obs.count_display(), "lots");
        assert_eq!(obs.resolved_count(), None);
    }

    #[test]
    fn test_builders() {
        let obs = Observation::new("Swallow", "Farm", "Bob", date(2024, 6, 20))
            .with_count(Count::new(12, CountQualifier::AtLeast))
            .with_breeding_code(12)
            .with_grid_square("NS5865")
            .with_comment("nest in barn");

        assert_eq!(obs.count_text, "12+");
        assert_eq!(obs.resolved_count(), Some(12));
        assert_eq!(obs.breeding, BreedingEvidence::ConfirmedBreeding);
        assert_eq!(obs.grid_square.as_deref(), Some("NS5865"));
        assert_eq!(obs.season(), Season::Summer);
        assert_eq!(obs.extra("Sensitive"), None);
    }
}
