//! Run configuration: which columns hold which fields, and how to treat bad data.

use serde::Deserialize;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// Binds the logical fields of an observation to header names in an input file.
///
/// The defaults match a BirdTrack export after the 1km grid reference column has been added.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Common species name.
    pub species: String,
    /// Place name.
    pub place: String,
    /// Observer name.
    pub observer: String,
    /// Date of the observation.
    pub date: String,
    /// Count as entered.
    pub count: String,
    /// 1km grid reference.
    pub grid_ref: String,
    /// BirdTrack breeding code.
    pub breeding_code: String,
    /// Scientific name. Skipped when the input has no such column.
    pub scientific_name: Option<String>,
    /// Free text comment. Skipped when the input has no such column.
    pub comment: Option<String>,
    /// Unique id of the source row. When absent one is made up from the file name and row.
    pub source_id: Option<String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap {
            species: "Species".to_owned(),
            place: "Place".to_owned(),
            observer: "Observer".to_owned(),
            date: "Date".to_owned(),
            count: "Count".to_owned(),
            grid_ref: "1km Grid Ref".to_owned(),
            breeding_code: "Breeding evidence".to_owned(),
            scientific_name: Some("Scientific name".to_owned()),
            comment: Some("Comment".to_owned()),
            source_id: None,
        }
    }
}

/// What to do with a count that is outside the count grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr, EnumIter)]
pub enum MalformedCountPolicy {
    /// Keep the row for every metric except count sums and report it.
    #[strum(to_string = "skip")]
    Skip,
    /// Stop the run at the first malformed count.
    #[strum(to_string = "abort")]
    Abort,
}

/// The coding scheme used in the breeding code column of an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr, EnumIter)]
pub enum BreedingCodeScheme {
    /// BirdTrack numeric codes, 0 to 16.
    #[strum(to_string = "birdtrack")]
    BirdTrack,
    /// eBird letter codes, translated to BirdTrack codes on read.
    #[strum(to_string = "ebird")]
    Ebird,
}

/// Options that apply to a whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// The number of 1km squares in the recording area, the denominator for coverage figures.
    pub total_squares: Option<u32>,
    /// Treatment of counts outside the count grammar.
    pub malformed_counts: MalformedCountPolicy,
    /// How breeding codes are written in the input.
    pub breeding_codes: BreedingCodeScheme,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            total_squares: None,
            malformed_counts: MalformedCountPolicy::Skip,
            breeding_codes: BreedingCodeScheme::BirdTrack,
        }
    }
}

impl RunOptions {
    /// The coverage denominator, if there is a usable one.
    pub fn denominator(&self) -> Option<u32> {
        self.total_squares.filter(|&squares| squares > 0)
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use std::str::FromStr;

    #[test]
    fn test_column_map_partial_yaml_keeps_defaults() {
        let columns: ColumnMap =
            serde_yaml::from_str("species: Common name\nsource_id: Obs ID\n").unwrap();

        assert_eq!(columns.species, "Common name");
        assert_eq!(columns.source_id.as_deref(), Some("Obs ID"));
        assert_eq!(columns.place, "Place");
        assert_eq!(columns.grid_ref, "1km Grid Ref");
    }

    #[test]
    fn test_denominator_ignores_zero() {
        let mut options = RunOptions::default();
        assert_eq!(options.denominator(), None);

        options.total_squares = Some(0);
        assert_eq!(options.denominator(), None);

        options.total_squares = Some(412);
        assert_eq!(options.denominator(), Some(412));
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(
            MalformedCountPolicy::from_str("abort").unwrap(),
            MalformedCountPolicy::Abort
        );
        assert_eq!(
            BreedingCodeScheme::from_str("ebird").unwrap(),
            BreedingCodeScheme::Ebird
        );
    }
}
