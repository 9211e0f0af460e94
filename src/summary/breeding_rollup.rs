use super::{distinct_grid_squares, percent_of, sum_counts};
use crate::observation::{BreedingEvidence, Observation};
use chrono::NaiveDate;

/// Statistics for the records of one species in one breeding tier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TierStats {
    /// Number of records.
    pub records: usize,
    /// Sum of resolved counts.
    pub total_count: u64,
    /// Number of distinct 1km squares.
    pub grid_squares: usize,
    /// Share of the recording area's squares, `None` without a denominator.
    pub grid_squares_percent: Option<f64>,
    /// First record.
    pub earliest: Option<NaiveDate>,
    /// Last record.
    pub latest: Option<NaiveDate>,
}

impl TierStats {
    fn from_rows(rows: &[&Observation], total_squares: Option<u32>) -> Self {
        let grid_squares = distinct_grid_squares(rows.iter().copied());

        TierStats {
            records: rows.len(),
            total_count: sum_counts(rows.iter().copied()),
            grid_squares,
            grid_squares_percent: percent_of(grid_squares, total_squares),
            earliest: rows.iter().map(|obs| obs.date).min(),
            latest: rows.iter().map(|obs| obs.date).max(),
        }
    }
}

/// Breeding evidence of one species, split by tier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BreedingRollup {
    /// Possible breeder.
    pub possible: TierStats,
    /// Probable breeding.
    pub probable: TierStats,
    /// Confirmed breeding.
    pub confirmed: TierStats,
}

impl BreedingRollup {
    /// Roll up a species' records, or `None` if none of them is in a breeding tier.
    pub fn from_rows(rows: &[&Observation], total_squares: Option<u32>) -> Option<Self> {
        if !rows.iter().any(|obs| obs.breeding.is_breeding_tier()) {
            return None;
        }

        let tier = |evidence: BreedingEvidence| -> TierStats {
            let in_tier: Vec<&Observation> = rows
                .iter()
                .copied()
                .filter(|obs| obs.breeding == evidence)
                .collect();
            TierStats::from_rows(&in_tier, total_squares)
        };

        Some(BreedingRollup {
            possible: tier(BreedingEvidence::PossibleBreeder),
            probable: tier(BreedingEvidence::ProbableBreeding),
            confirmed: tier(BreedingEvidence::ConfirmedBreeding),
        })
    }

    /// The tiers with their labels, least certain first.
    pub fn tiers(&self) -> [(&'static str, &TierStats); 3] {
        [
            ("Possible", &self.possible),
            ("Probable", &self.probable),
            ("Confirmed", &self.confirmed),
        ]
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use crate::observation::Count;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_no_breeding_tier_no_rollup() {
        let obs = vec![
            Observation::new("Robin", "Garden", "Alice", date(1, 2)),
            Observation::new("Robin", "Garden", "Alice", date(1, 3)).with_breeding_code(0),
        ];
        let rows: Vec<&Observation> = obs.iter().collect();

        assert_eq!(BreedingRollup::from_rows(&rows, Some(10)), None);
    }

    #[test]
    fn test_rollup_by_tier() {
        let obs = vec![
            Observation::new("Robin", "Garden", "Alice", date(4, 2))
                .with_breeding_code(2)
                .with_grid_square("NS5865"),
            Observation::new("Robin", "Wood", "Alice", date(5, 9))
                .with_breeding_code(9)
                .with_count(Count::exact(2))
                .with_grid_square("NS5866"),
            Observation::new("Robin", "Lane", "Bob", date(4, 20))
                .with_breeding_code(4)
                .with_count(Count::exact(3))
                .with_grid_square("NS5866"),
            Observation::new("Robin", "Lane", "Bob", date(1, 20)),
        ];
        let rows: Vec<&Observation> = obs.iter().collect();

        let rollup = BreedingRollup::from_rows(&rows, Some(4)).unwrap();

        assert_eq!(rollup.possible.records, 1);
        assert_eq!(rollup.possible.earliest, Some(date(4, 2)));

        assert_eq!(rollup.probable.records, 2);
        assert_eq!(rollup.probable.total_count, 5);
        assert_eq!(rollup.probable.grid_squares, 1);
        assert_eq!(rollup.probable.grid_squares_percent, Some(25.0));
        assert_eq!(rollup.probable.earliest, Some(date(4, 20)));
        assert_eq!(rollup.probable.latest, Some(date(5, 9)));

        assert_eq!(rollup.confirmed.records, 0);
        assert_eq!(rollup.confirmed.total_count, 0);
        assert_eq!(rollup.confirmed.grid_squares_percent, Some(0.0));
        assert_eq!(rollup.confirmed.earliest, None);
        assert_eq!(rollup.confirmed.latest, None);
        assert_eq!(rollup.tiers()[2].0, "Confirmed");
    }
}
