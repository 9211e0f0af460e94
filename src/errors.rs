//! Module for errors.
use std::{error::Error, fmt::Display};

/// Error from the record processing interface.
#[derive(Debug)]
pub enum BirdRecordsErr {
    // Inherited errors from std
    /// Error forwarded from std
    IO(::std::io::Error),

    // Other forwarded errors
    /// Error reading or writing a csv file.
    Csv(::csv::Error),
    /// Error parsing a yaml configuration file.
    Yaml(::serde_yaml::Error),
    /// Error compiling a regular expression.
    Regex(::regex::Error),
    /// Error forwarded from the strum crate
    StrumError(strum::ParseError),

    // My own errors from this crate
    /// A count string outside the count grammar.
    MalformedCount(String),
    /// A date that could not be parsed in any of the accepted formats.
    MalformedDate(String),
    /// A column binding that does not match any header in the input.
    MissingColumn(String),
    /// The taxonomy tables would make normalization non-idempotent.
    InvalidTaxonomy(String),
    /// The run was configured to stop at the first malformed count.
    AbortedOnMalformedCount {
        /// Where the row came from, `<file stem>:<row number>`.
        location: String,
        /// The count as it was entered.
        value: String,
    },
    /// A row from an RSPB export that could not be converted.
    InvalidRspbRow {
        /// The RSPB observation id.
        obs_id: String,
        /// What was wrong with it.
        reason: String,
    },
    /// There was an internal logic error.
    LogicError(&'static str),
}

impl Display for BirdRecordsErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::BirdRecordsErr::*;

        match self {
            IO(err) => write!(f, "std lib io error: {}", err),

            Csv(err) => write!(f, "csv error: {}", err),
            Yaml(err) => write!(f, "yaml error: {}", err),
            Regex(err) => write!(f, "regex error: {}", err),
            StrumError(err) => write!(f, "error forwarded from strum crate: {}", err),

            MalformedCount(val) => write!(f, "malformed count: '{}'", val),
            MalformedDate(val) => write!(f, "malformed date: '{}'", val),
            MissingColumn(col) => write!(f, "column not found in input: {}", col),
            InvalidTaxonomy(msg) => write!(f, "invalid taxonomy: {}", msg),
            AbortedOnMalformedCount { location, value } => {
                write!(f, "malformed count '{}' at {}, run aborted", value, location)
            }
            InvalidRspbRow { obs_id, reason } => {
                write!(f, "unable to convert RSPB observation {}: {}", obs_id, reason)
            }
            LogicError(msg) => write!(f, "internal logic error: {}", msg),
        }
    }
}

impl Error for BirdRecordsErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use crate::errors::BirdRecordsErr::*;

        match self {
            IO(err) => Some(err),
            Csv(err) => Some(err),
            Yaml(err) => Some(err),
            Regex(err) => Some(err),
            StrumError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<::std::io::Error> for BirdRecordsErr {
    fn from(err: ::std::io::Error) -> BirdRecordsErr {
        BirdRecordsErr::IO(err)
    }
}

impl From<::csv::Error> for BirdRecordsErr {
    fn from(err: ::csv::Error) -> BirdRecordsErr {
        BirdRecordsErr::Csv(err)
    }
}

impl From<::serde_yaml::Error> for BirdRecordsErr {
    fn from(err: ::serde_yaml::Error) -> BirdRecordsErr {
        BirdRecordsErr::Yaml(err)
    }
}

impl From<::regex::Error> for BirdRecordsErr {
    fn from(err: ::regex::Error) -> BirdRecordsErr {
        BirdRecordsErr::Regex(err)
    }
}

impl From<strum::ParseError> for BirdRecordsErr {
    fn from(err: strum::ParseError) -> BirdRecordsErr {
        BirdRecordsErr::StrumError(err)
    }
}
