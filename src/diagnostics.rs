//! Data quality problems found during a run.
//!
//! Problems with single rows do not stop a run. They are recorded here, logged as they happen,
//! and summarized at the end so nothing is dropped silently.

use crate::{observation::ObservationKey, table::Table, table_printer::TablePrinter};
use std::fmt::Display;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

/// One data quality problem.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A count outside the count grammar. The row is left out of count sums.
    MalformedCount { location: String, value: String },
    /// A breeding code outside 0 to 16. The row's evidence is `Invalid`.
    UnknownBreedingCode { location: String, value: String },
    /// A date that could not be read. The row is left out of the run.
    MalformedDate { location: String, value: String },
    /// A row that could not be converted from a source export. The row is left out of the run.
    RejectedRow { location: String, reason: String },
    /// Rows that still share a key after reconciliation. They are withheld for manual review.
    AmbiguousReconciliation {
        key: ObservationKey,
        source_ids: Vec<Option<String>>,
    },
    /// Coverage percentages were requested without a number of squares.
    MissingDenominator,
    /// More 1km squares have records than the area has. Percentages are capped at 100.
    CoverageOverflow { squares: usize, total: u32 },
}

/// The kinds of diagnostic, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoStaticStr, EnumIter)]
#[allow(missing_docs)]
pub enum DiagnosticKind {
    #[strum(to_string = "malformed count")]
    MalformedCount,
    #[strum(to_string = "unknown breeding code")]
    UnknownBreedingCode,
    #[strum(to_string = "malformed date")]
    MalformedDate,
    #[strum(to_string = "rejected row")]
    RejectedRow,
    #[strum(to_string = "ambiguous reconciliation")]
    AmbiguousReconciliation,
    #[strum(to_string = "missing denominator")]
    MissingDenominator,
    #[strum(to_string = "coverage overflow")]
    CoverageOverflow,
}

impl Diagnostic {
    /// The kind of this diagnostic.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::MalformedCount { .. } => DiagnosticKind::MalformedCount,
            Diagnostic::UnknownBreedingCode { .. } => DiagnosticKind::UnknownBreedingCode,
            Diagnostic::MalformedDate { .. } => DiagnosticKind::MalformedDate,
            Diagnostic::RejectedRow { .. } => DiagnosticKind::RejectedRow,
            Diagnostic::AmbiguousReconciliation { .. } => DiagnosticKind::AmbiguousReconciliation,
            Diagnostic::MissingDenominator => DiagnosticKind::MissingDenominator,
            Diagnostic::CoverageOverflow { .. } => DiagnosticKind::CoverageOverflow,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use Diagnostic::*;

        match self {
            MalformedCount { location, value } => {
                write!(f, "{}: count '{}' is not a number", location, value)
            }
            UnknownBreedingCode { location, value } => {
                write!(f, "{}: breeding code '{}' is not 0 to 16", location, value)
            }
            MalformedDate { location, value } => {
                write!(f, "{}: date '{}' could not be read", location, value)
            }
            RejectedRow { location, reason } => write!(f, "{}: {}", location, reason),
            AmbiguousReconciliation { key, source_ids } => {
                let ids: Vec<&str> = source_ids
                    .iter()
                    .map(|id| id.as_deref().unwrap_or("<no id>"))
                    .collect();
                write!(
                    f,
                    "{} rows still duplicate {} (source ids: {})",
                    source_ids.len(),
                    key,
                    ids.join(", ")
                )
            }
            MissingDenominator => write!(
                f,
                "total number of 1km squares not given, coverage percentages omitted"
            ),
            CoverageOverflow { squares, total } => write!(
                f,
                "{} 1km squares have records but the area only has {}, coverage capped at 100%",
                squares, total
            ),
        }
    }
}

impl DiagnosticKind {
    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }
}

/// Collects diagnostics over a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Record and log a problem.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// Everything recorded so far, in the order it was found.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many problems of a kind were recorded.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind() == kind).count()
    }

    /// Number of problems of each kind that occurred at least once, in report order.
    pub fn summary(&self) -> Vec<(DiagnosticKind, usize)> {
        DiagnosticKind::iter()
            .map(|kind| (kind, self.count(kind)))
            .filter(|&(_, num)| num > 0)
            .collect()
    }

    /// The summary as a table with `Problem` and `Rows` columns.
    pub fn summary_table(&self) -> Table {
        let mut table = Table::new("Diagnostics", &["Problem", "Rows"]);
        for (kind, num) in self.summary() {
            table.push_row(vec![kind.as_static_str().to_owned(), num.to_string()]);
        }

        table
    }

    /// The summary laid out for the terminal, with the total number of problems above it.
    pub fn summary_printer(&self) -> TablePrinter {
        TablePrinter::from_table(&self.summary_table())
            .with_header(format!("{} problems found in the input.", self.entries.len()))
            .with_footer("Each problem is also logged as a warning.".to_owned())
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
