//! Exam window and holiday calendar.
//!
//! Classifies each day of an exam window as a working day, a weekend day,
//! or a holiday.
//!
//! # Precedence
//! Weekend classification wins over holidays. A weekday is a holiday iff it
//! matches a `Holiday` by exact date, or, for recurring holidays, by month
//! and day in any year. Every other weekday is a working day.
//!
//! # Distance
//! Day-distance between exams is counted in working days: the number of
//! working days in the half-open range `(earlier, later]`. Two consecutive
//! working days are one apart even when a weekend lies between them.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// An inclusive date range `[start, end]`.
///
/// An inverted window (`end < start`) is representable; it contains no days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateWindow {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates a new window.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `end` lies before `start`.
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// Whether a date falls within the window.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days in the window (0 when inverted).
    pub fn len_days(&self) -> usize {
        if self.is_inverted() {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }

    /// Iterates every calendar day in the window in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// A non-working date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Holiday {
    /// Holiday date. For recurring holidays only month and day matter.
    pub date: NaiveDate,
    /// Display name.
    pub name: String,
    /// Matches the same month and day in every year.
    pub recurring: bool,
}

impl Holiday {
    /// Creates a one-off holiday.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            name: String::new(),
            recurring: false,
        }
    }

    /// Creates a holiday that recurs every year on the same month and day.
    pub fn recurring(date: NaiveDate) -> Self {
        Self {
            date,
            name: String::new(),
            recurring: true,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether this holiday falls on `date`.
    pub fn matches(&self, date: NaiveDate) -> bool {
        if self.recurring {
            self.date.month() == date.month() && self.date.day() == date.day()
        } else {
            self.date == date
        }
    }
}

/// Classification of a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayKind {
    /// Weekday that is not a holiday.
    Working,
    /// Saturday or Sunday.
    Weekend,
    /// Weekday matching a holiday.
    Holiday,
}

/// Day counts for a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSummary {
    /// Calendar days in the window.
    pub total_days: usize,
    /// Days classified `Working`.
    pub working_days: usize,
    /// Days classified `Weekend`.
    pub weekend_days: usize,
    /// Days classified `Holiday` (weekend holidays are counted as weekend).
    pub holiday_days: usize,
    /// Holidays that match at least one day of the window.
    pub holidays_in_window: Vec<Holiday>,
    /// The working dates in ascending order.
    pub working_dates: Vec<NaiveDate>,
}

/// Holiday calendar used to classify days.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Calendar {
    /// Known holidays.
    pub holidays: Vec<Holiday>,
}

impl Calendar {
    /// Creates a calendar with no holidays (weekends only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a holiday.
    pub fn with_holiday(mut self, holiday: Holiday) -> Self {
        self.holidays.push(holiday);
        self
    }

    /// Adds several holidays.
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = Holiday>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    /// Classifies a date.
    pub fn classify(&self, date: NaiveDate) -> DayKind {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            DayKind::Weekend
        } else if self.holidays.iter().any(|h| h.matches(date)) {
            DayKind::Holiday
        } else {
            DayKind::Working
        }
    }

    /// Whether a date is a working day.
    #[inline]
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.classify(date) == DayKind::Working
    }

    /// Working dates within the window, ascending.
    pub fn working_days(&self, window: &DateWindow) -> Vec<NaiveDate> {
        window.days().filter(|d| self.is_working_day(*d)).collect()
    }

    /// Working-day distance between two dates.
    ///
    /// Counts working days in `(min(a, b), max(a, b)]`. Symmetric; zero for
    /// equal dates.
    pub fn working_days_between(&self, a: NaiveDate, b: NaiveDate) -> u32 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        lo.iter_days()
            .skip(1)
            .take_while(|d| *d <= hi)
            .filter(|d| self.is_working_day(*d))
            .count() as u32
    }

    /// Summarizes the window: day counts per kind and the holidays inside it.
    ///
    /// An inverted window yields all-zero counts.
    pub fn analyze(&self, window: &DateWindow) -> CalendarSummary {
        let mut summary = CalendarSummary {
            total_days: 0,
            working_days: 0,
            weekend_days: 0,
            holiday_days: 0,
            holidays_in_window: Vec::new(),
            working_dates: Vec::new(),
        };

        for day in window.days() {
            summary.total_days += 1;
            match self.classify(day) {
                DayKind::Working => {
                    summary.working_days += 1;
                    summary.working_dates.push(day);
                }
                DayKind::Weekend => summary.weekend_days += 1,
                DayKind::Holiday => summary.holiday_days += 1,
            }
        }

        summary.holidays_in_window = self
            .holidays
            .iter()
            .filter(|h| window.days().any(|d| h.matches(d)))
            .cloned()
            .collect();

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_window_len_and_contains() {
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 1, 7));
        assert_eq!(w.len_days(), 7);
        assert!(w.contains(d(2024, 1, 1)));
        assert!(w.contains(d(2024, 1, 7)));
        assert!(!w.contains(d(2024, 1, 8)));
        assert_eq!(w.days().count(), 7);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let w = DateWindow::new(d(2024, 1, 7), d(2024, 1, 1));
        assert!(w.is_inverted());
        assert_eq!(w.len_days(), 0);
        assert_eq!(w.days().count(), 0);

        let summary = Calendar::new().analyze(&w);
        assert_eq!(summary.total_days, 0);
        assert_eq!(summary.working_days, 0);
        assert!(summary.working_dates.is_empty());
    }

    #[test]
    fn test_weekend_classification() {
        let cal = Calendar::new();
        // 2024-01-06 is a Saturday
        assert_eq!(cal.classify(d(2024, 1, 5)), DayKind::Working);
        assert_eq!(cal.classify(d(2024, 1, 6)), DayKind::Weekend);
        assert_eq!(cal.classify(d(2024, 1, 7)), DayKind::Weekend);
    }

    #[test]
    fn test_exact_holiday() {
        let cal = Calendar::new().with_holiday(Holiday::on(d(2024, 1, 3)));
        assert_eq!(cal.classify(d(2024, 1, 3)), DayKind::Holiday);
        assert_eq!(cal.classify(d(2025, 1, 3)), DayKind::Working); // Friday, other year
    }

    #[test]
    fn test_recurring_holiday_ignores_year() {
        let cal = Calendar::new().with_holiday(Holiday::recurring(d(2000, 1, 26)).with_name("R-Day"));
        assert_eq!(cal.classify(d(2024, 1, 26)), DayKind::Holiday); // Friday
        assert_eq!(cal.classify(d(2024, 1, 25)), DayKind::Working);
    }

    #[test]
    fn test_weekend_wins_over_holiday() {
        let cal = Calendar::new().with_holiday(Holiday::on(d(2024, 1, 6)));
        assert_eq!(cal.classify(d(2024, 1, 6)), DayKind::Weekend);
    }

    #[test]
    fn test_analyze_counts() {
        let cal = Calendar::new().with_holidays(vec![
            Holiday::on(d(2024, 1, 2)),
            Holiday::on(d(2024, 1, 13)), // Saturday, still "in window"
            Holiday::on(d(2024, 3, 1)),  // outside
        ]);
        let w = DateWindow::new(d(2024, 1, 1), d(2024, 1, 14));
        let s = cal.analyze(&w);

        assert_eq!(s.total_days, 14);
        assert_eq!(s.weekend_days, 4);
        assert_eq!(s.holiday_days, 1);
        assert_eq!(s.working_days, 9);
        assert_eq!(s.holidays_in_window.len(), 2);
        assert_eq!(s.working_dates.first(), Some(&d(2024, 1, 1)));
        assert_eq!(s.working_dates.get(1), Some(&d(2024, 1, 3)));
        assert_eq!(
            s.total_days,
            s.working_days + s.weekend_days + s.holiday_days
        );
    }

    #[test]
    fn test_working_days_between_skips_weekend() {
        let cal = Calendar::new();
        // Friday → Monday is one working day apart
        assert_eq!(cal.working_days_between(d(2024, 1, 5), d(2024, 1, 8)), 1);
        assert_eq!(cal.working_days_between(d(2024, 1, 8), d(2024, 1, 5)), 1);
        assert_eq!(cal.working_days_between(d(2024, 1, 1), d(2024, 1, 3)), 2);
        assert_eq!(cal.working_days_between(d(2024, 1, 3), d(2024, 1, 3)), 0);
    }

    #[test]
    fn test_working_days_between_skips_holiday() {
        let cal = Calendar::new().with_holiday(Holiday::on(d(2024, 1, 2)));
        assert_eq!(cal.working_days_between(d(2024, 1, 1), d(2024, 1, 3)), 1);
    }
}
