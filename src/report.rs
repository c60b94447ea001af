//! Athlete insights report assembly
//!
//! Orchestrates the pure calculators in `insights` into the full response
//! payload: KPIs with optional period-over-period deltas, distributions,
//! the weekly time series, rule-derived insight records and highlighted
//! trainings. Assembly itself is a pure function of the fetched record
//! sets; the database operations at the bottom feed it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::dates::DateRange;
use crate::errors::AppError;
use crate::insights::{
  average_intensity_score, compute_consistency, compute_trend, detect_spike,
  distribution_by_intensity, distribution_by_type, monotony_index, training_load,
  weekly_time_series, IntensityBucket, Trend, TypeBucket, WeeklyAggregate,
  ACTIVE_WEEK_MIN_TRAININGS, MONOTONY_WARNING_INDEX, TREND_FLAT_TOLERANCE,
};
use crate::models::{Intensity, Training};

/// At most this many trainings are highlighted, ranked by load.
pub const HIGHLIGHT_LIMIT: usize = 5;

/// Consistency is called out as good at this rate of active weeks...
const GOOD_CONSISTENCY_MIN_RATE: f64 = 70.0;
/// ...or at this trailing streak, whichever comes first.
const GOOD_CONSISTENCY_MIN_STREAK: usize = 3;
/// Below this rate (with enough weeks to judge) frequency is flagged.
const LOW_CONSISTENCY_MAX_RATE: f64 = 40.0;
const LOW_CONSISTENCY_MIN_WEEKS: usize = 3;

/// ---------------------------------------------------------------------------
/// Filters
/// ---------------------------------------------------------------------------

/// Intensity/type filter, applied identically to the current and the
/// comparison record sets before any metric is computed. `None` means ALL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingFilters {
  pub intensity: Option<Intensity>,
  pub training_type: Option<String>,
}

impl TrainingFilters {
  pub fn matches(&self, training: &Training) -> bool {
    self.intensity.map_or(true, |i| training.intensity == i)
      && self
        .training_type
        .as_deref()
        .map_or(true, |t| training.training_type == t)
  }

  fn apply(&self, trainings: &[Training]) -> Vec<Training> {
    trainings.iter().filter(|t| self.matches(t)).cloned().collect()
  }
}

/// ---------------------------------------------------------------------------
/// Response Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodEcho {
  pub from: NaiveDate,
  pub to: NaiveDate,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub compare_from: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub compare_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiTrend {
  Up,
  Down,
  Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpi {
  pub label: String,
  pub value: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delta: Option<f64>,
  pub unit: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trend: Option<KpiTrend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Info,
  Warning,
  Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
  Monotony,
  Spike,
  Consistency,
  Trend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
  pub id: String,
  pub severity: Severity,
  pub title: String,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub evidence: Option<String>,
  #[serde(rename = "type")]
  pub kind: InsightKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightReason {
  HighestLoad,
  LongestDuration,
  HighestIntensity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
  pub id: String,
  pub training_id: i64,
  #[serde(rename = "type")]
  pub training_type: String,
  pub reason: HighlightReason,
  pub value: i64,
  pub unit: String,
  pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distributions {
  pub by_type: Vec<TypeBucket>,
  pub by_intensity: Vec<IntensityBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteInsightsResponse {
  pub period: PeriodEcho,
  pub kpis: Vec<Kpi>,
  pub distribution: Distributions,
  pub time_series: Vec<WeeklyAggregate>,
  pub insights: Vec<InsightRecord>,
  pub highlights: Vec<Highlight>,
}

/// ---------------------------------------------------------------------------
/// Assembly
/// ---------------------------------------------------------------------------

pub struct InsightParams {
  pub trainings_current: Vec<Training>,
  pub trainings_compare: Option<Vec<Training>>,
  pub period: DateRange,
  pub compare_period: Option<DateRange>,
  pub filters: TrainingFilters,
}

/// Build the full insights payload. Pure: identical inputs yield an
/// identical response, and absence of data is a valid state, never an error.
pub fn build_athlete_insights(params: &InsightParams) -> AthleteInsightsResponse {
  let current = params.filters.apply(&params.trainings_current);
  let compare = params
    .trainings_compare
    .as_deref()
    .map(|trainings| params.filters.apply(trainings));

  let period = PeriodEcho {
    from: params.period.from,
    to: params.period.to,
    compare_from: params.compare_period.map(|p| p.from),
    compare_to: params.compare_period.map(|p| p.to),
  };

  let kpis = build_kpis(&current, compare.as_deref());

  if current.is_empty() {
    // Short-circuit: canonical empty shapes, a single informational
    // insight, and none of the detectors run.
    return AthleteInsightsResponse {
      period,
      kpis,
      distribution: Distributions {
        by_type: distribution_by_type(&current),
        by_intensity: distribution_by_intensity(&current),
      },
      time_series: Vec::new(),
      insights: vec![no_data_insight()],
      highlights: Vec::new(),
    };
  }

  let time_series = weekly_time_series(&current);
  let insights = build_insight_records(&time_series);
  let highlights = build_highlights(&current);

  AthleteInsightsResponse {
    period,
    kpis,
    distribution: Distributions {
      by_type: distribution_by_type(&current),
      by_intensity: distribution_by_intensity(&current),
    },
    time_series,
    insights,
    highlights,
  }
}

/// ---------------------------------------------------------------------------
/// KPIs
/// ---------------------------------------------------------------------------

fn build_kpis(current: &[Training], compare: Option<&[Training]>) -> Vec<Kpi> {
  let total_trainings = current.len() as f64;
  let total_minutes: i64 = current.iter().map(|t| t.duration_minutes).sum();
  let total_load: i64 = current.iter().map(training_load).sum();
  let avg_intensity = average_intensity_score(current);

  let baseline = compare.map(|compare| {
    (
      compare.len() as f64,
      compare.iter().map(|t| t.duration_minutes).sum::<i64>() as f64,
      compare.iter().map(training_load).sum::<i64>() as f64,
      average_intensity_score(compare),
    )
  });

  let kpi = |label: &str, value: f64, unit: &str, previous: Option<f64>| Kpi {
    label: label.to_string(),
    value,
    delta: previous.map(|p| value - p),
    unit: unit.to_string(),
    trend: previous.map(|p| kpi_trend(value, p)),
  };

  vec![
    kpi(
      "Total Trainings",
      total_trainings,
      "trainings",
      baseline.as_ref().map(|b| b.0),
    ),
    kpi(
      "Total Minutes",
      total_minutes as f64,
      "min",
      baseline.as_ref().map(|b| b.1),
    ),
    kpi(
      "Total Load",
      total_load as f64,
      "units",
      baseline.as_ref().map(|b| b.2),
    ),
    kpi(
      "Average Intensity",
      (avg_intensity * 10.0).round() / 10.0,
      "score",
      baseline.as_ref().map(|b| b.3),
    ),
  ]
}

/// Direction of a KPI against its comparison baseline, with the same 5%
/// flat band the weekly trend uses. A zero baseline never reads as "down":
/// it is stable when the current value is also zero, otherwise up.
fn kpi_trend(current: f64, previous: f64) -> KpiTrend {
  if previous == 0.0 {
    return if current == 0.0 { KpiTrend::Stable } else { KpiTrend::Up };
  }

  let change = (current - previous) / previous;
  if change.abs() < TREND_FLAT_TOLERANCE {
    KpiTrend::Stable
  } else if change > 0.0 {
    KpiTrend::Up
  } else {
    KpiTrend::Down
  }
}

/// ---------------------------------------------------------------------------
/// Insight Records
/// ---------------------------------------------------------------------------

fn no_data_insight() -> InsightRecord {
  InsightRecord {
    id: "no-data".to_string(),
    severity: Severity::Info,
    title: "No data in period".to_string(),
    description: "There are no trainings recorded for the selected period.".to_string(),
    evidence: None,
    kind: InsightKind::Trend,
  }
}

/// Run the detectors over the weekly series and emit one record per fired
/// signal. `(trend, warning)` is only ever produced by the downward-trend
/// rule, which keeps the recommendation mapping unambiguous.
fn build_insight_records(series: &[WeeklyAggregate]) -> Vec<InsightRecord> {
  let loads: Vec<f64> = series.iter().map(|w| w.load as f64).collect();
  let mut records = Vec::new();

  let spike = detect_spike(&loads);
  if spike.is_spike {
    let spike_week = &series[spike.spike_week_index.unwrap_or(series.len() - 1)];
    records.push(InsightRecord {
      id: "load-spike".to_string(),
      severity: Severity::Warning,
      title: "Load spike detected".to_string(),
      description: format!(
        "The most recent week's load was {:.1}x the average of the preceding weeks.",
        spike.ratio
      ),
      evidence: Some(format!(
        "week of {}: load {}",
        spike_week.week_start, spike_week.load
      )),
      kind: InsightKind::Spike,
    });
  }

  if let Some(index) = monotony_index(&loads) {
    if index >= MONOTONY_WARNING_INDEX {
      records.push(InsightRecord {
        id: "high-monotony".to_string(),
        severity: Severity::Warning,
        title: "Repetitive load pattern".to_string(),
        description: format!(
          "Weekly load varies very little (monotony index {:.1}).",
          index
        ),
        evidence: Some(format!("{} weeks analyzed", series.len())),
        kind: InsightKind::Monotony,
      });
    }
  }

  match compute_trend(&loads) {
    Trend::Up => records.push(InsightRecord {
      id: "trend-up".to_string(),
      severity: Severity::Info,
      title: "Upward load trend".to_string(),
      description: "Average load of the last two weeks is above the two weeks before."
        .to_string(),
      evidence: None,
      kind: InsightKind::Trend,
    }),
    Trend::Down => records.push(InsightRecord {
      id: "trend-down".to_string(),
      severity: Severity::Warning,
      title: "Downward load trend".to_string(),
      description: "Average load of the last two weeks is below the two weeks before."
        .to_string(),
      evidence: None,
      kind: InsightKind::Trend,
    }),
    Trend::Flat | Trend::Unknown => {}
  }

  let consistency = compute_consistency(series, ACTIVE_WEEK_MIN_TRAININGS);
  if consistency.consistency_rate >= GOOD_CONSISTENCY_MIN_RATE
    || consistency.streak >= GOOD_CONSISTENCY_MIN_STREAK
  {
    records.push(InsightRecord {
      id: "good-consistency".to_string(),
      severity: Severity::Info,
      title: "Consistent training routine".to_string(),
      description: format!(
        "{} of {} weeks reached at least {} trainings.",
        consistency.active_weeks,
        series.len(),
        ACTIVE_WEEK_MIN_TRAININGS
      ),
      evidence: Some(format!("current streak: {} weeks", consistency.streak)),
      kind: InsightKind::Consistency,
    });
  } else if series.len() >= LOW_CONSISTENCY_MIN_WEEKS
    && consistency.consistency_rate < LOW_CONSISTENCY_MAX_RATE
  {
    records.push(InsightRecord {
      id: "irregular-frequency".to_string(),
      severity: Severity::Warning,
      title: "Irregular training frequency".to_string(),
      description: format!(
        "Only {} of {} weeks reached at least {} trainings.",
        consistency.active_weeks,
        series.len(),
        ACTIVE_WEEK_MIN_TRAININGS
      ),
      evidence: None,
      kind: InsightKind::Consistency,
    });
  }

  if series.len() > 1 {
    if let Some(busiest) = series.iter().max_by_key(|w| w.minutes) {
      records.push(InsightRecord {
        id: "most-active-week".to_string(),
        severity: Severity::Info,
        title: "Most active week".to_string(),
        description: format!(
          "Week of {} had the highest volume: {} minutes.",
          busiest.week_start, busiest.minutes
        ),
        evidence: Some(format!("{} trainings that week", busiest.trainings_count)),
        kind: InsightKind::Trend,
      });
    }
  }

  records
}

/// ---------------------------------------------------------------------------
/// Highlights
/// ---------------------------------------------------------------------------

/// Top trainings by load, descending. The sort is stable, so trainings with
/// equal load keep their original (chronological) order.
fn build_highlights(trainings: &[Training]) -> Vec<Highlight> {
  let mut ranked: Vec<&Training> = trainings.iter().collect();
  ranked.sort_by_key(|t| std::cmp::Reverse(training_load(t)));

  ranked
    .into_iter()
    .take(HIGHLIGHT_LIMIT)
    .enumerate()
    .map(|(i, training)| Highlight {
      id: format!("top-load-{}", i + 1),
      training_id: training.id,
      training_type: training.training_type.clone(),
      reason: HighlightReason::HighestLoad,
      value: training_load(training),
      unit: "units".to_string(),
      date: training.created_at.date_naive(),
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Database Operations
/// ---------------------------------------------------------------------------

/// Active trainings of one athlete inside a day range, oldest first.
pub async fn fetch_trainings_between(
  pool: &SqlitePool,
  athlete_id: i64,
  range: &DateRange,
) -> Result<Vec<Training>, AppError> {
  let (from, to) = range.bounds_utc();

  sqlx::query_as::<_, Training>(
    r#"
    SELECT * FROM trainings
    WHERE athlete_id = ?1
      AND deleted_at IS NULL
      AND created_at >= ?2
      AND created_at <= ?3
    ORDER BY created_at ASC
    "#,
  )
  .bind(athlete_id)
  .bind(from)
  .bind(to)
  .fetch_all(pool)
  .await
  .map_err(|e| AppError::database("load trainings for insights", e))
}

pub struct InsightsQuery {
  pub athlete_id: i64,
  pub period: DateRange,
  pub compare: bool,
  pub filters: TrainingFilters,
}

/// Resolve the athlete, fetch the period (and, when requested, the
/// immediately preceding period; the two fetches have no ordering
/// dependency and run concurrently), then assemble.
///
/// Insights stay available for inactive athletes: historical review is a
/// read, not a mutation.
pub async fn athlete_insights(
  pool: &SqlitePool,
  query: InsightsQuery,
) -> Result<AthleteInsightsResponse, AppError> {
  let athlete_id: Option<i64> = sqlx::query_scalar("SELECT id FROM athletes WHERE id = ?1")
    .bind(query.athlete_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("load athlete", e))?;

  if athlete_id.is_none() {
    return Err(AppError::NotFound("athlete"));
  }

  let compare_period = query.compare.then(|| query.period.preceding());

  let (trainings_current, trainings_compare) = match compare_period {
    Some(prior) => {
      let (current, compare) = tokio::try_join!(
        fetch_trainings_between(pool, query.athlete_id, &query.period),
        fetch_trainings_between(pool, query.athlete_id, &prior),
      )?;
      (current, Some(compare))
    }
    None => (
      fetch_trainings_between(pool, query.athlete_id, &query.period).await?,
      None,
    ),
  };

  Ok(build_athlete_insights(&InsightParams {
    trainings_current,
    trainings_compare,
    period: query.period,
    compare_period,
    filters: query.filters,
  }))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
