//! Pure date arithmetic for period resolution and ISO-week bucketing
//!
//! Calculators never read an ambient "now"; the current day is injected at
//! the command boundary and everything below works on plain `NaiveDate`s.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Inclusive day range, normalized to whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub from: NaiveDate,
  pub to: NaiveDate,
}

impl DateRange {
  pub fn len_days(&self) -> i64 {
    (self.to - self.from).num_days() + 1
  }

  /// The immediately preceding range of equal length: ends the day before
  /// `from`, no gap, no overlap.
  pub fn preceding(&self) -> DateRange {
    let to = self.from - Duration::days(1);
    DateRange {
      from: to - Duration::days(self.len_days() - 1),
      to,
    }
  }

  /// UTC timestamp bounds: 00:00:00 on `from` through 23:59:59 on `to`.
  pub fn bounds_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = self.from.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    let end = self.to.and_hms_opt(23, 59, 59).expect("end of day is always valid");
    (start.and_utc(), end.and_utc())
  }
}

/// Preset period of `days` length ending today: `from = today - (days - 1)`.
pub fn preset_range(days: i64, today: NaiveDate) -> DateRange {
  DateRange {
    from: today - Duration::days(days - 1),
    to: today,
  }
}

/// Monday of the ISO week containing `date`.
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
  let week = date.iso_week();
  NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
    .expect("ISO week derived from a valid date")
}

/// ISO week key `(iso_year, week_number)`. The ISO year can differ from the
/// calendar year near Dec 31 / Jan 1; tuple ordering is chronological.
pub fn iso_week_number(date: NaiveDate) -> (i32, u32) {
  let week = date.iso_week();
  (week.year(), week.week())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_iso_week_start_is_monday() {
    // 2024-01-01 is itself a Monday
    assert_eq!(iso_week_start(date(2024, 1, 1)), date(2024, 1, 1));
    // Wednesday and Sunday of the same week map back to it
    assert_eq!(iso_week_start(date(2024, 1, 3)), date(2024, 1, 1));
    assert_eq!(iso_week_start(date(2024, 1, 7)), date(2024, 1, 1));
    // Next Monday starts a new week
    assert_eq!(iso_week_start(date(2024, 1, 8)), date(2024, 1, 8));
  }

  #[test]
  fn test_iso_week_across_year_boundary() {
    // 2024-12-30 (Mon) through 2025-01-05 (Sun) are all ISO 2025-W01
    assert_eq!(iso_week_number(date(2024, 12, 30)), (2025, 1));
    assert_eq!(iso_week_number(date(2025, 1, 2)), (2025, 1));
    assert_eq!(iso_week_start(date(2025, 1, 2)), date(2024, 12, 30));
    // The Saturday before belongs to 2024-W52
    assert_eq!(iso_week_number(date(2024, 12, 28)), (2024, 52));
    // 2023-01-01 (Sun) is still ISO 2022-W52
    assert_eq!(iso_week_number(date(2023, 1, 1)), (2022, 52));
    assert_eq!(iso_week_start(date(2023, 1, 1)), date(2022, 12, 26));
  }

  #[test]
  fn test_preset_range_includes_today() {
    let range = preset_range(7, date(2024, 3, 20));
    assert_eq!(range.from, date(2024, 3, 14));
    assert_eq!(range.to, date(2024, 3, 20));
    assert_eq!(range.len_days(), 7);

    let single = preset_range(1, date(2024, 3, 20));
    assert_eq!(single.from, single.to);
  }

  #[test]
  fn test_preceding_range_is_contiguous_and_equal_length() {
    let range = preset_range(30, date(2024, 3, 30));
    let prior = range.preceding();
    assert_eq!(prior.len_days(), 30);
    assert_eq!(prior.to, range.from - Duration::days(1));
    assert_eq!(prior.from, date(2024, 1, 31));
  }

  #[test]
  fn test_bounds_cover_whole_days() {
    let range = DateRange {
      from: date(2024, 1, 1),
      to: date(2024, 1, 31),
    };
    let (start, end) = range.bounds_utc();
    assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    assert_eq!(end.to_rfc3339(), "2024-01-31T23:59:59+00:00");
  }
}
