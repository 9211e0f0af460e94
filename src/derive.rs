//! Columns derived from a single column of an export, one cell at a time.

use crate::{
    ebird::translate_breeding_code,
    observation::{one_km_square, parse_count, parse_date, BreedingEvidence, Season},
};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// A column that can be computed from one other column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr, EnumIter)]
pub enum Derivation {
    /// The number a count resolves to.
    #[strum(to_string = "count")]
    NumericalCount,
    /// The breeding evidence tier of a BirdTrack breeding code.
    #[strum(to_string = "breeding")]
    BreedingStatus,
    /// The report season of a date.
    #[strum(to_string = "season")]
    ReportSeason,
    /// The year of a date.
    #[strum(to_string = "year")]
    Year,
    /// eBird breeding codes rewritten as BirdTrack codes, in place.
    #[strum(to_string = "ebird-breeding")]
    EbirdBreeding,
    /// The 1km square of a full grid reference.
    #[strum(to_string = "grid1k")]
    OneKmSquare,
}

impl Derivation {
    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }

    /// One line description.
    pub fn about(self) -> &'static str {
        use Derivation::*;

        match self {
            NumericalCount => "Add the number each count resolves to.",
            BreedingStatus => "Add the breeding evidence tier of each breeding code.",
            ReportSeason => "Add the report season of each date.",
            Year => "Add the year of each date.",
            EbirdBreeding => "Rewrite eBird letter breeding codes as BirdTrack codes.",
            OneKmSquare => "Add the 1km square of each grid reference.",
        }
    }

    /// The column read by default.
    pub fn source_column(self) -> &'static str {
        use Derivation::*;

        match self {
            NumericalCount => "Count",
            BreedingStatus | EbirdBreeding => "Breeding evidence",
            ReportSeason | Year => "Date",
            OneKmSquare => "Grid reference",
        }
    }

    /// The column written by default.
    pub fn new_column(self) -> &'static str {
        use Derivation::*;

        match self {
            NumericalCount => "Numerical count",
            BreedingStatus => "Decoded Breeding Status",
            ReportSeason => "Season",
            Year => "Year",
            EbirdBreeding => "Breeding evidence",
            OneKmSquare => "1km Grid Ref",
        }
    }

    /// Compute the derived cell. Cells that cannot be read give an empty cell.
    pub fn apply(self, cell: &str) -> String {
        use Derivation::*;

        match self {
            NumericalCount => numerical_count(cell).unwrap_or_default(),
            BreedingStatus => BreedingEvidence::from_code_str(cell)
                .as_static_str()
                .to_owned(),
            ReportSeason => season_of(cell).unwrap_or_default(),
            Year => year_of(cell).unwrap_or_default(),
            EbirdBreeding => translate_breeding_code(cell),
            OneKmSquare => one_km_square(cell).unwrap_or_default(),
        }
    }
}

/// The number a count resolves to, as text.
pub fn numerical_count(cell: &str) -> Option<String> {
    match parse_count(cell) {
        Ok(value) => Some(value.to_string()),
        Err(err) => {
            log::warn!("{}", err);
            None
        }
    }
}

/// The report season of a date cell.
pub fn season_of(cell: &str) -> Option<String> {
    parse_date(cell)
        .map(|date| Season::for_date(date).as_static_str().to_owned())
        .map_err(|err| log::warn!("{}", err))
        .ok()
}

/// The year of a date cell.
pub fn year_of(cell: &str) -> Option<String> {
    use chrono::Datelike;

    parse_date(cell)
        .map(|date| date.year().to_string())
        .map_err(|err| log::warn!("{}", err))
        .ok()
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
