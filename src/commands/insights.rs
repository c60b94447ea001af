//! Tauri commands for athlete insights
//!
//! Input parsing and period resolution happen here; the current day is
//! captured once at this boundary so everything below stays pure.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tauri::State;

use crate::dates::{preset_range, DateRange};
use crate::db::AppState;
use crate::errors::AppError;
use crate::models::Intensity;
use crate::recommendations::{build_recommendations, RecommendationSet};
use crate::report::{self, AthleteInsightsResponse, InsightRecord, InsightsQuery, TrainingFilters};

const DEFAULT_PERIOD: &str = "30";

/// Full insights payload for one athlete. Works for inactive athletes too
/// (historical review); fails with NotFound only when the id resolves to
/// nothing at all.
#[tauri::command]
pub async fn get_athlete_insights(
  state: State<'_, Arc<AppState>>,
  athlete_id: i64,
  period: Option<String>,
  from_date: Option<String>,
  to_date: Option<String>,
  compare: Option<bool>,
  intensity_filter: Option<String>,
  training_type_filter: Option<String>,
) -> Result<AthleteInsightsResponse, AppError> {
  if athlete_id <= 0 {
    return Err(AppError::validation("athlete id must be a positive number"));
  }

  let today = Utc::now().date_naive();
  let period = resolve_period(
    period.as_deref().unwrap_or(DEFAULT_PERIOD),
    from_date.as_deref(),
    to_date.as_deref(),
    today,
  )?;

  let filters = TrainingFilters {
    intensity: parse_intensity_filter(intensity_filter.as_deref().unwrap_or("ALL"))?,
    training_type: parse_type_filter(training_type_filter.as_deref().unwrap_or("ALL")),
  };

  report::athlete_insights(
    &state.db,
    InsightsQuery {
      athlete_id,
      period,
      compare: compare.unwrap_or(false),
      filters,
    },
  )
  .await
}

/// Recommendations derived from an insights payload. Pure lookup, no state:
/// the frontend passes back the records it received.
#[tauri::command]
pub fn get_recommendations(insights: Vec<InsightRecord>) -> RecommendationSet {
  build_recommendations(&insights)
}

/// ---------------------------------------------------------------------------
/// Input Parsing
/// ---------------------------------------------------------------------------

fn resolve_period(
  period: &str,
  from_date: Option<&str>,
  to_date: Option<&str>,
  today: NaiveDate,
) -> Result<DateRange, AppError> {
  match period {
    "7" => Ok(preset_range(7, today)),
    "30" => Ok(preset_range(30, today)),
    "90" => Ok(preset_range(90, today)),
    "custom" => {
      let (from, to) = match (from_date, to_date) {
        (Some(from), Some(to)) => (from, to),
        _ => {
          return Err(AppError::validation(
            "from_date and to_date are required when period is custom",
          ))
        }
      };

      let from = parse_date(from)?;
      let to = parse_date(to)?;
      if from > to {
        return Err(AppError::validation("from_date must not be after to_date"));
      }

      Ok(DateRange { from, to })
    }
    other => Err(AppError::validation(format!(
      "period must be one of 7, 30, 90 or custom (got {:?})",
      other
    ))),
  }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
  NaiveDate::parse_from_str(value, "%Y-%m-%d")
    .map_err(|_| AppError::validation(format!("dates must be YYYY-MM-DD (got {:?})", value)))
}

fn parse_intensity_filter(value: &str) -> Result<Option<Intensity>, AppError> {
  if value == "ALL" {
    return Ok(None);
  }
  value
    .parse::<Intensity>()
    .map(Some)
    .map_err(|_| {
      AppError::validation(format!(
        "intensity filter must be ALL, low, moderate or high (got {:?})",
        value
      ))
    })
}

fn parse_type_filter(value: &str) -> Option<String> {
  if value == "ALL" {
    None
  } else {
    Some(value.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
