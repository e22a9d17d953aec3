use std::fmt;

use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;

/// Inclusive range of dates requested from the APOD API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl FetchWindow {
    /// Nine days back plus today
    pub const DEFAULT_LOOKBACK_DAYS: u32 = 9;
    /// APOD dates roll over at midnight US Eastern
    pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::New_York;

    pub fn ending_on(end: NaiveDate, lookback_days: u32) -> Self {
        let start = end
            .checked_sub_days(Days::new(lookback_days.into()))
            .unwrap_or(NaiveDate::MIN);

        FetchWindow { start, end }
    }

    /// Window ending on the current date in `tz`
    pub fn ending_today(tz: Tz, lookback_days: u32) -> Self {
        let today = Utc::now().with_timezone(&tz).date_naive();
        Self::ending_on(today, lookback_days)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    /// Number of dates in the window
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }
}

impl fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_spans_ten_days() {
        let window = FetchWindow::ending_on(date(2024, 1, 10), FetchWindow::DEFAULT_LOOKBACK_DAYS);

        assert_eq!(window.start(), date(2024, 1, 1));
        assert_eq!(window.end(), date(2024, 1, 10));
        assert_eq!(window.num_days(), 10);
    }

    #[test]
    fn test_window_crosses_month_and_year() {
        let window = FetchWindow::ending_on(date(2024, 1, 3), 9);
        assert_eq!(window.start(), date(2023, 12, 25));
        assert!(window.contains(date(2023, 12, 31)));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = FetchWindow::ending_on(date(2024, 1, 10), 9);

        assert!(window.contains(date(2024, 1, 1)));
        assert!(window.contains(date(2024, 1, 10)));
        assert!(!window.contains(date(2023, 12, 31)));
        assert!(!window.contains(date(2024, 1, 11)));
    }

    #[test]
    fn test_zero_lookback_is_a_single_day() {
        let window = FetchWindow::ending_on(date(2024, 2, 29), 0);
        assert_eq!(window.start(), window.end());
        assert_eq!(window.num_days(), 1);
    }

    #[test]
    fn test_ending_today_uses_time_zone() {
        let window = FetchWindow::ending_today(FetchWindow::DEFAULT_TIME_ZONE, 9);
        let today = Utc::now()
            .with_timezone(&chrono_tz::America::New_York)
            .date_naive();

        assert_eq!(window.end(), today);
        assert_eq!(window.num_days(), 10);
    }
}
