use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Athlete {
  pub id: i64,
  pub name: String,
  pub email: String,
  pub date_of_birth: NaiveDate,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Athlete {
  pub fn is_active(&self) -> bool {
    self.deleted_at.is_none()
  }
}

/// For creating new athletes (without id, timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAthlete {
  pub name: String,
  pub email: String,
  pub date_of_birth: NaiveDate,
}

impl NewAthlete {
  pub fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
    validate_name(&self.name)?;
    validate_email(&self.email)?;
    validate_date_of_birth(self.date_of_birth, today)
  }
}

/// Partial update payload; None fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthleteUpdate {
  pub name: Option<String>,
  pub email: Option<String>,
  pub date_of_birth: Option<NaiveDate>,
}

impl AthleteUpdate {
  pub fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
    if let Some(name) = &self.name {
      validate_name(name)?;
    }
    if let Some(email) = &self.email {
      validate_email(email)?;
    }
    if let Some(dob) = self.date_of_birth {
      validate_date_of_birth(dob, today)?;
    }
    Ok(())
  }
}

fn validate_name(name: &str) -> Result<(), AppError> {
  let len = name.chars().count();
  if len < 3 {
    return Err(AppError::validation("name must have at least 3 characters"));
  }
  if len > 255 {
    return Err(AppError::validation("name must have at most 255 characters"));
  }
  Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
  if email.chars().count() > 255 {
    return Err(AppError::validation("email must have at most 255 characters"));
  }

  // Structural check only; deliverability is not our problem.
  let mut parts = email.splitn(2, '@');
  let local = parts.next().unwrap_or_default();
  let domain = parts.next().unwrap_or_default();
  let valid = !local.is_empty()
    && !domain.is_empty()
    && domain.contains('.')
    && !domain.starts_with('.')
    && !domain.ends_with('.')
    && !email.contains(char::is_whitespace);

  if !valid {
    return Err(AppError::validation("invalid email address"));
  }
  Ok(())
}

fn validate_date_of_birth(dob: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
  if dob >= today {
    return Err(AppError::validation("date of birth must be in the past"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
  }

  fn valid_payload() -> NewAthlete {
    NewAthlete {
      name: "Ana Souza".to_string(),
      email: "ana@example.com".to_string(),
      date_of_birth: NaiveDate::from_ymd_opt(1995, 3, 10).unwrap(),
    }
  }

  #[test]
  fn test_valid_payload_passes() {
    assert!(valid_payload().validate(today()).is_ok());
  }

  #[test]
  fn test_short_name_rejected() {
    let mut payload = valid_payload();
    payload.name = "Al".to_string();
    assert!(payload.validate(today()).is_err());
  }

  #[test]
  fn test_malformed_email_rejected() {
    for email in ["not-an-email", "@example.com", "ana@", "ana@nodot", "a b@example.com"] {
      let mut payload = valid_payload();
      payload.email = email.to_string();
      assert!(payload.validate(today()).is_err(), "accepted {}", email);
    }
  }

  #[test]
  fn test_future_birth_date_rejected() {
    let mut payload = valid_payload();
    payload.date_of_birth = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    assert!(payload.validate(today()).is_err());
  }

  #[test]
  fn test_partial_update_skips_absent_fields() {
    let update = AthleteUpdate::default();
    assert!(update.validate(today()).is_ok());

    let update = AthleteUpdate {
      email: Some("broken".to_string()),
      ..Default::default()
    };
    assert!(update.validate(today()).is_err());
  }
}
