use crate::taxonomy::VisitorStatus;
use chrono::{Datelike, NaiveDate};

/// First and last dates a seasonal visitor was recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisitorWindow {
    /// First date of the visit, `None` if there is no record to fix it.
    pub earliest: Option<NaiveDate>,
    /// Last date of the visit, `None` if there is no record to fix it.
    pub latest: Option<NaiveDate>,
}

impl VisitorWindow {
    /// Window for a visitor with the given status.
    ///
    /// A summer visitor's window is simply the first and last record. A winter visitor's stay
    /// crosses the new year, so arrival is the first record from July to December and departure
    /// the last record from January to June.
    pub fn for_status<I>(status: VisitorStatus, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        match status {
            VisitorStatus::Summer => Self::summer(dates),
            VisitorStatus::Winter => Self::winter(dates),
        }
    }

    fn summer<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates
            .into_iter()
            .fold(VisitorWindow::default(), |window, date| VisitorWindow {
                earliest: Some(window.earliest.map_or(date, |e| e.min(date))),
                latest: Some(window.latest.map_or(date, |l| l.max(date))),
            })
    }

    fn winter<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut window = VisitorWindow::default();

        for date in dates {
            if date.month() >= 7 {
                window.earliest = Some(window.earliest.map_or(date, |e| e.min(date)));
            } else {
                window.latest = Some(window.latest.map_or(date, |l| l.max(date)));
            }
        }

        window
    }
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
    fn test_winter_window_crosses_new_year() {
        let dates = vec![date(2024, 1, 10), date(2024, 11, 20), date(2024, 12, 5)];
        let window = VisitorWindow::for_status(VisitorStatus::Winter, dates);

        assert_eq!(window.earliest, Some(date(2024, 11, 20)));
        assert_eq!(window.latest, Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_winter_window_missing_half_is_undefined() {
        let dates = vec![date(2024, 2, 10), date(2024, 3, 1)];
        let window = VisitorWindow::for_status(VisitorStatus::Winter, dates);

        assert_eq!(window.earliest, None);
        assert_eq!(window.latest, Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_summer_window_is_min_max() {
        let dates = vec![date(2024, 5, 2), date(2024, 4, 11), date(2024, 9, 20)];
        let window = VisitorWindow::for_status(VisitorStatus::Summer, dates);

        assert_eq!(window.earliest, Some(date(2024, 4, 11)));
        assert_eq!(window.latest, Some(date(2024, 9, 20)));

        let empty = VisitorWindow::for_status(VisitorStatus::Summer, vec![]);
        assert_eq!(empty, VisitorWindow::default());
    }
}
