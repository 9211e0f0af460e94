use chrono::{Datelike, NaiveDate};
use std::fmt::Display;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// Report seasons.
///
/// Winter/Spring runs from 1 January to 15 April, Summer from 16 April to 31 July and
/// Autumn/Winter from 1 August to 31 December. Iteration order is report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, IntoStaticStr, EnumIter)]
pub enum Season {
    /// 1 January to 15 April.
    #[strum(to_string = "Winter/Spring")]
    WinterSpring,
    /// 16 April to 31 July.
    #[strum(to_string = "Summer")]
    Summer,
    /// 1 August to 31 December.
    #[strum(to_string = "Autumn/Winter")]
    AutumnWinter,
}

impl Season {
    /// The season a date falls in.
    pub fn for_date(date: NaiveDate) -> Self {
        match (date.month(), date.day()) {
            (1..=3, _) => Season::WinterSpring,
            (4, day) if day <= 15 => Season::WinterSpring,
            (4..=7, _) => Season::Summer,
            _ => Season::AutumnWinter,
        }
    }

    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.as_static_str())
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
