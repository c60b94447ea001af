use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_DURATION_MINUTES: i64 = 480;

/// Training intensity. Stored as lowercase TEXT; the scoring in
/// `insights::training_load` builds on `score()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Intensity {
  Low,
  Moderate,
  High,
}

impl Intensity {
  pub const ALL: [Intensity; 3] = [Intensity::Low, Intensity::Moderate, Intensity::High];

  /// Load multiplier: low=1, moderate=2, high=3.
  pub fn score(self) -> i64 {
    match self {
      Intensity::Low => 1,
      Intensity::Moderate => 2,
      Intensity::High => 3,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Intensity::Low => "low",
      Intensity::Moderate => "moderate",
      Intensity::High => "high",
    }
  }
}

impl std::fmt::Display for Intensity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Intensity {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "low" => Ok(Self::Low),
      "moderate" => Ok(Self::Moderate),
      "high" => Ok(Self::High),
      _ => Err(format!("Unknown intensity: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Training {
  pub id: i64,
  pub athlete_id: i64,
  #[serde(rename = "type")]
  #[sqlx(rename = "type")]
  pub training_type: String,
  pub duration_minutes: i64,
  pub intensity: Intensity,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Training {
  pub fn is_active(&self) -> bool {
    self.deleted_at.is_none()
  }
}

/// For creating new trainings (without id, timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTraining {
  pub athlete_id: i64,
  #[serde(rename = "type")]
  pub training_type: String,
  pub duration_minutes: i64,
  pub intensity: Intensity,
  pub notes: Option<String>,
}

impl NewTraining {
  pub fn validate(&self) -> Result<(), AppError> {
    if self.athlete_id <= 0 {
      return Err(AppError::validation("athlete id must be a positive number"));
    }
    validate_type(&self.training_type)?;
    validate_duration(self.duration_minutes)?;
    validate_notes(self.notes.as_deref())
  }
}

/// Partial update payload; None fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingUpdate {
  #[serde(rename = "type")]
  pub training_type: Option<String>,
  pub duration_minutes: Option<i64>,
  pub intensity: Option<Intensity>,
  pub notes: Option<String>,
}

impl TrainingUpdate {
  pub fn validate(&self) -> Result<(), AppError> {
    if let Some(training_type) = &self.training_type {
      validate_type(training_type)?;
    }
    if let Some(duration) = self.duration_minutes {
      validate_duration(duration)?;
    }
    validate_notes(self.notes.as_deref())
  }
}

fn validate_type(training_type: &str) -> Result<(), AppError> {
  let len = training_type.chars().count();
  if len < 3 {
    return Err(AppError::validation("type must have at least 3 characters"));
  }
  if len > 100 {
    return Err(AppError::validation("type must have at most 100 characters"));
  }
  Ok(())
}

fn validate_duration(minutes: i64) -> Result<(), AppError> {
  if minutes <= 0 {
    return Err(AppError::validation("duration must be a positive number of minutes"));
  }
  if minutes > MAX_DURATION_MINUTES {
    return Err(AppError::validation(
      "duration must be at most 8 hours (480 minutes)",
    ));
  }
  Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<(), AppError> {
  if let Some(notes) = notes {
    if notes.chars().count() > 1000 {
      return Err(AppError::validation("notes must have at most 1000 characters"));
    }
  }
  Ok(())
}
