//! Deterministic insight calculators
//!
//! Pure functions that turn a list of training records into load metrics,
//! weekly aggregates and statistical signals. Nothing in here touches the
//! database or the clock; the report layer feeds in records and packages
//! the results.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::{iso_week_number, iso_week_start};
use crate::models::{Intensity, Training};

/// ---------------------------------------------------------------------------
/// Policy Constants
/// ---------------------------------------------------------------------------
/// These are policy knobs, not derived values; the test suite pins them.

/// Monotony is undefined below this many weeks of data.
pub const MONOTONY_MIN_WEEKS: usize = 3;

/// Weekly-load standard deviation below this is treated as "no variation".
pub const MONOTONY_STDDEV_FLOOR: f64 = 0.1;

/// Sentinel reported for a near-zero standard deviation instead of letting
/// the mean/stddev ratio blow up.
pub const MONOTONY_SENTINEL: f64 = 999.0;

/// Monotony index at or above this is flagged as a repetitive pattern.
pub const MONOTONY_WARNING_INDEX: f64 = 2.0;

/// The last week counts as a spike when its load reaches this multiple of
/// the mean of all preceding weeks.
pub const SPIKE_RATIO_THRESHOLD: f64 = 1.5;

/// Relative change within this band counts as a flat trend.
pub const TREND_FLAT_TOLERANCE: f64 = 0.05;

/// A week is "active" for consistency purposes at this many trainings.
pub const ACTIVE_WEEK_MIN_TRAININGS: i64 = 2;

/// ---------------------------------------------------------------------------
/// Training Load
/// ---------------------------------------------------------------------------

/// Load = duration in minutes times the intensity score (low=1, moderate=2,
/// high=3). The base unit every higher-order metric builds on.
pub fn training_load(training: &Training) -> i64 {
  training.duration_minutes * training.intensity.score()
}

/// Duration-weighted mean of intensity scores. Returns 0.0 for an empty
/// slice so callers never divide zero by zero.
pub fn average_intensity_score(trainings: &[Training]) -> f64 {
  if trainings.is_empty() {
    return 0.0;
  }

  let total_minutes: i64 = trainings.iter().map(|t| t.duration_minutes).sum();
  let weighted: i64 = trainings.iter().map(training_load).sum();

  weighted as f64 / total_minutes as f64
}

/// ---------------------------------------------------------------------------
/// Weekly Time Series
/// ---------------------------------------------------------------------------

/// One ISO week (Monday start) with at least one training in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
  pub week_start: NaiveDate,
  pub week_end: NaiveDate,
  pub minutes: i64,
  pub load: i64,
  pub trainings_count: i64,
}

/// Group trainings into per-ISO-week aggregates, ascending by week start.
///
/// The series is sparse: weeks without trainings are never emitted, because
/// the trend and spike detectors operate on the sequence of active weeks.
/// Grouping keys on the ISO year+week of the UTC date, so assignments near
/// Dec 31 / Jan 1 land in the correct week.
pub fn weekly_time_series(trainings: &[Training]) -> Vec<WeeklyAggregate> {
  let mut weeks: BTreeMap<(i32, u32), WeeklyAggregate> = BTreeMap::new();

  for training in trainings {
    let date = training.created_at.date_naive();
    let entry = weeks.entry(iso_week_number(date)).or_insert_with(|| {
      let week_start = iso_week_start(date);
      WeeklyAggregate {
        week_start,
        week_end: week_start + Duration::days(6),
        minutes: 0,
        load: 0,
        trainings_count: 0,
      }
    });

    entry.minutes += training.duration_minutes;
    entry.load += training_load(training);
    entry.trainings_count += 1;
  }

  // BTreeMap iterates in key order; (iso_year, week) tuples sort
  // chronologically, so no extra sort pass is needed.
  weeks.into_values().collect()
}

/// ---------------------------------------------------------------------------
/// Distributions
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityBucket {
  pub intensity: Intensity,
  pub count: i64,
  pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBucket {
  #[serde(rename = "type")]
  pub training_type: String,
  pub count: i64,
  pub percentage: i64,
}

fn percentage_of(count: i64, total: i64) -> i64 {
  if total == 0 {
    0
  } else {
    (count as f64 / total as f64 * 100.0).round() as i64
  }
}

/// Always exactly three rows (low, moderate, high), zero counts included.
/// Percentages are rounded independently and may not sum to exactly 100.
pub fn distribution_by_intensity(trainings: &[Training]) -> Vec<IntensityBucket> {
  let total = trainings.len() as i64;

  Intensity::ALL
    .iter()
    .map(|&intensity| {
      let count = trainings.iter().filter(|t| t.intensity == intensity).count() as i64;
      IntensityBucket {
        intensity,
        count,
        percentage: percentage_of(count, total),
      }
    })
    .collect()
}

/// One row per distinct type label present, sorted by label. Labels are not
/// canonicalized: "corrida" and "Corrida" are distinct rows.
pub fn distribution_by_type(trainings: &[Training]) -> Vec<TypeBucket> {
  let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
  for training in trainings {
    *counts.entry(training.training_type.as_str()).or_insert(0) += 1;
  }

  let total = trainings.len() as i64;
  counts
    .into_iter()
    .map(|(training_type, count)| TypeBucket {
      training_type: training_type.to_string(),
      count,
      percentage: percentage_of(count, total),
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Signal Detectors
/// ---------------------------------------------------------------------------

/// Mean / standard deviation of weekly loads.
///
/// Returns None below `MONOTONY_MIN_WEEKS` data points, so callers can
/// distinguish "not enough data" from a computed value. A standard
/// deviation under `MONOTONY_STDDEV_FLOOR` yields `MONOTONY_SENTINEL`.
pub fn monotony_index(weekly_loads: &[f64]) -> Option<f64> {
  if weekly_loads.len() < MONOTONY_MIN_WEEKS {
    return None;
  }

  let n = weekly_loads.len() as f64;
  let mean = weekly_loads.iter().sum::<f64>() / n;
  let variance = weekly_loads.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
  let stddev = variance.sqrt();

  if stddev < MONOTONY_STDDEV_FLOOR {
    Some(MONOTONY_SENTINEL)
  } else {
    Some(mean / stddev)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeResult {
  pub is_spike: bool,
  pub spike_week_index: Option<usize>,
  pub ratio: f64,
}

impl SpikeResult {
  fn none() -> Self {
    Self {
      is_spike: false,
      spike_week_index: None,
      ratio: 0.0,
    }
  }
}

/// Test the most recent week's load against the mean of all prior weeks.
/// Fewer than two points (or a zero prior mean) cannot spike: ratio 0.
pub fn detect_spike(weekly_loads: &[f64]) -> SpikeResult {
  if weekly_loads.len() < 2 {
    return SpikeResult::none();
  }

  let (last, prior) = weekly_loads.split_last().expect("len checked above");
  let prior_mean = prior.iter().sum::<f64>() / prior.len() as f64;
  if prior_mean <= 0.0 {
    return SpikeResult::none();
  }

  let ratio = last / prior_mean;
  let is_spike = ratio >= SPIKE_RATIO_THRESHOLD;

  SpikeResult {
    is_spike,
    spike_week_index: is_spike.then_some(weekly_loads.len() - 1),
    ratio,
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consistency {
  /// Weeks meeting the minimum-trainings threshold.
  pub active_weeks: usize,
  /// Trailing run of active weeks, counted backward from the most recent.
  pub streak: usize,
  /// Active weeks as a percentage of all weeks in range.
  pub consistency_rate: f64,
}

/// Count active weeks and the trailing streak. The threshold is a
/// parameter so callers can tighten or relax what "active" means;
/// `ACTIVE_WEEK_MIN_TRAININGS` is the default policy.
pub fn compute_consistency(weeks: &[WeeklyAggregate], min_trainings: i64) -> Consistency {
  if weeks.is_empty() {
    return Consistency {
      active_weeks: 0,
      streak: 0,
      consistency_rate: 0.0,
    };
  }

  let is_active = |week: &WeeklyAggregate| week.trainings_count >= min_trainings;

  let active_weeks = weeks.iter().filter(|w| is_active(w)).count();
  let streak = weeks.iter().rev().take_while(|w| is_active(w)).count();

  Consistency {
    active_weeks,
    streak,
    consistency_rate: active_weeks as f64 / weeks.len() as f64 * 100.0,
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
  Up,
  Down,
  Flat,
  Unknown,
}

/// Compare the average load of the last two weeks against the (up to) two
/// weeks before that. Unknown below three points, or when the reference
/// average is zero (never divide by it).
pub fn compute_trend(weekly_loads: &[f64]) -> Trend {
  if weekly_loads.len() < 3 {
    return Trend::Unknown;
  }

  let split = weekly_loads.len() - 2;
  let recent = &weekly_loads[split..];
  let reference = &weekly_loads[split.saturating_sub(2)..split];

  let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;
  let reference_avg = reference.iter().sum::<f64>() / reference.len() as f64;
  if reference_avg == 0.0 {
    return Trend::Unknown;
  }

  let change = (recent_avg - reference_avg) / reference_avg;
  if change.abs() < TREND_FLAT_TOLERANCE {
    Trend::Flat
  } else if change > 0.0 {
    Trend::Up
  } else {
    Trend::Down
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
