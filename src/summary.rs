//! Corpus and per-species statistics.
//!
//! The input is expected to be normalized and free of duplicate keys, otherwise a sighting
//! reported twice counts twice in every distinct value metric.

use crate::{
    config::RunOptions,
    diagnostics::{Diagnostic, Diagnostics},
    observation::Observation,
    taxonomy::{Taxonomy, VisitorStatus},
};
use itertools::Itertools;
use std::collections::BTreeMap;

mod breeding_rollup;
mod calendar;
mod tables;
mod visitors;

pub use self::breeding_rollup::{BreedingRollup, TierStats};
pub use self::calendar::{MonthlyCounts, MONTH_NAMES};
pub use self::tables::tables;
pub use self::visitors::VisitorWindow;

/// Statistics over every record in a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorpusSummary {
    /// Number of records.
    pub records: usize,
    /// Number of distinct species.
    pub species: usize,
    /// Number of distinct place labels.
    pub places: usize,
    /// Number of distinct observers.
    pub observers: usize,
    /// Number of distinct days.
    pub days: usize,
    /// Sum of resolved counts.
    pub total_count: u64,
    /// Number of distinct 1km squares.
    pub grid_squares: usize,
    /// Share of the recording area's squares with a record.
    pub grid_squares_percent: Option<f64>,
}

/// Statistics for one species.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesSummary {
    /// Canonical species name.
    pub species: String,
    /// Number of records.
    pub records: usize,
    /// Number of distinct place labels.
    pub places: usize,
    /// Number of distinct observers.
    pub observers: usize,
    /// Number of distinct days.
    pub days: usize,
    /// Sum of resolved counts.
    pub total_count: u64,
    /// Number of distinct 1km squares.
    pub grid_squares: usize,
    /// Share of the recording area's squares with a record of this species.
    pub grid_squares_percent: Option<f64>,
    /// Records per calendar month.
    pub monthly: MonthlyCounts,
    /// Breeding evidence, only if some record carries a breeding tier.
    pub breeding: Option<BreedingRollup>,
    /// Arrival and departure, only for known seasonal visitors.
    pub visitor: Option<(VisitorStatus, VisitorWindow)>,
}

/// Everything the aggregator computes in one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Whole corpus statistics.
    pub corpus: CorpusSummary,
    /// One summary per species, sorted by name.
    pub species: Vec<SpeciesSummary>,
}

/// Compute the corpus and per-species statistics.
///
/// Percentages use the run's number of squares for every species. When it is missing or zero
/// they are left out and a [`Diagnostic::MissingDenominator`] is recorded. More squares with
/// records than the area has is recorded as a [`Diagnostic::CoverageOverflow`].
pub fn summarize(
    observations: &[Observation],
    taxonomy: &Taxonomy,
    options: &RunOptions,
    diagnostics: &mut Diagnostics,
) -> Report {
    let total_squares = options.denominator();
    if total_squares.is_none() {
        diagnostics.record(Diagnostic::MissingDenominator);
    }

    let corpus = summarize_corpus(observations, total_squares);
    // Every species and tier covers a subset of the corpus squares.
    if let Some(total) = total_squares {
        if corpus.grid_squares > total as usize {
            diagnostics.record(Diagnostic::CoverageOverflow {
                squares: corpus.grid_squares,
                total,
            });
        }
    }

    let mut by_species: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        by_species.entry(obs.species.as_str()).or_default().push(obs);
    }

    let species: Vec<SpeciesSummary> = by_species
        .into_iter()
        .map(|(name, rows)| {
            summarize_species(name, &rows, taxonomy.visitor_status(name), total_squares)
        })
        .collect();

    log::info!(
        "summarized {} records of {} species",
        corpus.records,
        species.len()
    );

    Report { corpus, species }
}

/// Compute the statistics of the whole corpus.
pub fn summarize_corpus(observations: &[Observation], total_squares: Option<u32>) -> CorpusSummary {
    let grid_squares = distinct_grid_squares(observations.iter());

    CorpusSummary {
        records: observations.len(),
        species: observations.iter().map(|obs| &obs.species).unique().count(),
        places: observations.iter().map(|obs| &obs.place).unique().count(),
        observers: observations.iter().map(|obs| &obs.observer).unique().count(),
        days: observations.iter().map(|obs| obs.date).unique().count(),
        total_count: sum_counts(observations.iter()),
        grid_squares,
        grid_squares_percent: percent_of(grid_squares, total_squares),
    }
}

/// Compute the statistics of one species from its records.
pub fn summarize_species(
    species: &str,
    rows: &[&Observation],
    visitor: Option<VisitorStatus>,
    total_squares: Option<u32>,
) -> SpeciesSummary {
    let grid_squares = distinct_grid_squares(rows.iter().copied());
    let dates = || rows.iter().map(|obs| obs.date);

    SpeciesSummary {
        species: species.to_owned(),
        records: rows.len(),
        places: rows.iter().map(|obs| &obs.place).unique().count(),
        observers: rows.iter().map(|obs| &obs.observer).unique().count(),
        days: dates().unique().count(),
        total_count: sum_counts(rows.iter().copied()),
        grid_squares,
        grid_squares_percent: percent_of(grid_squares, total_squares),
        monthly: MonthlyCounts::from_dates(dates()),
        breeding: BreedingRollup::from_rows(rows, total_squares),
        visitor: visitor.map(|status| (status, VisitorWindow::for_status(status, dates()))),
    }
}

/// `part` as a percentage of `total`, capped at 100. `None` when there is no usable total.
pub fn percent_of(part: usize, total: Option<u32>) -> Option<f64> {
    let total = total.filter(|&total| total > 0)?;

    let percent = part as f64 / f64::from(total) * 100.0;
    Some(percent.min(100.0))
}

fn sum_counts<'a, I>(rows: I) -> u64
where
    I: Iterator<Item = &'a Observation>,
{
    rows.filter_map(Observation::resolved_count)
        .fold(0, u64::saturating_add)
}

fn distinct_grid_squares<'a, I>(rows: I) -> usize
where
    I: Iterator<Item = &'a Observation>,
{
    rows.filter_map(|obs| obs.grid_square.as_deref())
        .filter(|square| !square.is_empty())
        .unique()
        .count()
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
