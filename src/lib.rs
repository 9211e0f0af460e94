#![deny(missing_docs)]
//! Package to clean, reconcile, and summarize bird observation records exported from BirdTrack
//! and eBird.
//!
//! Records are read from csv files through a [`ColumnMap`], species names are normalized with a
//! [`Taxonomy`], duplicate records are reconciled, and per species statistics are written out as
//! a set of named tables. Problems with individual rows never stop a run, they are collected in
//! [`Diagnostics`] and reported at the end.

//
// Public API
//
pub use crate::cmd_line::{init_logging, CommonCmdLineArgs};
pub use crate::config::{BreedingCodeScheme, ColumnMap, MalformedCountPolicy, RunOptions};
pub use crate::derive::{numerical_count, season_of, year_of, Derivation};
pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use crate::ebird::{translate_breeding_code, EbirdBreedingCode};
pub use crate::errors::BirdRecordsErr;
pub use crate::observation::{
    one_km_square, parse_count, parse_date, BreedingEvidence, Count, CountQualifier, Observation,
    ObservationKey, Season, DATE_FORMAT,
};
pub use crate::reconcile::{
    distinct_keys, group_by_key, reconcile, AmbiguousGroup, ReconcilePolicy, Reconciled,
};
pub use crate::summary::{summarize, Report};
pub use crate::table::Table;
pub use crate::table_io::{
    add_column, read_observations, read_observations_from, write_observations,
    write_observations_to, write_table, OBSERVATION_COLUMNS,
};
pub use crate::table_printer::TablePrinter;
pub use crate::taxonomy::{Taxonomy, VisitorStatus};

pub mod report;
pub mod rspb;
pub mod summary;

//
// Implementation only
//
mod cmd_line;
mod config;
mod derive;
mod diagnostics;
mod ebird;
mod errors;
mod observation;
mod reconcile;
mod table;
mod table_io;
mod table_printer;
mod taxonomy;
