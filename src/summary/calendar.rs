use chrono::{Datelike, NaiveDate};
use std::ops::Index;

/// Short month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Number of records in each calendar month, January first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthlyCounts([u32; 12]);

impl MonthlyCounts {
    /// Count the dates falling in each month.
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut counts = [0u32; 12];
        for date in dates {
            counts[date.month0() as usize] += 1;
        }
        MonthlyCounts(counts)
    }

    /// The counts as a slice, January first.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Sum over all months.
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl Index<usize> for MonthlyCounts {
    type Output = u32;

    fn index(&self, month0: usize) -> &u32 {
        &self.0[month0]
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_all_in_june() {
        let dates = (1..=3).map(|d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap());
        let counts = MonthlyCounts::from_dates(dates);

        assert_eq!(counts.as_slice(), &[0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0]);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts[5], 3);
    }

    #[test]
    fn test_empty_is_twelve_zeros() {
        let counts = MonthlyCounts::from_dates(vec![]);
        assert_eq!(counts.as_slice().len(), 12);
        assert_eq!(counts.total(), 0);
    }
}
