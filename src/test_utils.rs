//! Test utilities and helpers for integration and unit testing
//!
//! Common test infrastructure: in-memory database setup/teardown, payload
//! factories and helper assertions.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::athlete::NewAthlete;
use crate::models::training::NewTraining;
use crate::models::Intensity;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Payload Factories
/// ---------------------------------------------------------------------------

pub fn new_athlete_payload(name: &str, email: &str) -> NewAthlete {
  NewAthlete {
    name: name.to_string(),
    email: email.to_string(),
    date_of_birth: NaiveDate::from_ymd_opt(1995, 3, 10).unwrap(),
  }
}

pub fn new_training_payload(athlete_id: i64, training_type: &str, minutes: i64) -> NewTraining {
  NewTraining {
    athlete_id,
    training_type: training_type.to_string(),
    duration_minutes: minutes,
    intensity: Intensity::Moderate,
    notes: None,
  }
}

/// Insert a training with an explicit creation timestamp, bypassing the
/// service layer. Insights tests need sessions at known dates.
pub async fn seed_training_at(
  pool: &SqlitePool,
  athlete_id: i64,
  training_type: &str,
  minutes: i64,
  intensity: Intensity,
  created_at: DateTime<Utc>,
) -> i64 {
  let result = sqlx::query(
    r#"
    INSERT INTO trainings (athlete_id, type, duration_minutes, intensity, notes, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)
    "#,
  )
  .bind(athlete_id)
  .bind(training_type)
  .bind(minutes)
  .bind(intensity)
  .bind(created_at)
  .execute(pool)
  .await
  .expect("Failed to seed training");

  result.last_insert_rowid()
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('athletes', 'trainings')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected both tables, got {:?}", tables);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_training_at_uses_given_timestamp() {
    let pool = setup_test_db().await;

    sqlx::query(
      "INSERT INTO athletes (name, email, date_of_birth, created_at, updated_at) VALUES ('Ana', 'ana@example.com', '1995-03-10', ?1, ?1)",
    )
    .bind(Utc::now())
    .execute(&pool)
    .await
    .unwrap();

    let created_at: DateTime<Utc> = "2024-01-15T10:00:00Z".parse().unwrap();
    let id = seed_training_at(&pool, 1, "Corrida", 30, Intensity::Moderate, created_at).await;

    let stored: crate::models::Training = sqlx::query_as("SELECT * FROM trainings WHERE id = ?1")
      .bind(id)
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(stored.created_at, created_at);

    teardown_test_db(pool).await;
  }
}
