//! Training CRUD with the active/inactive lifecycle
//!
//! Same state machine as athletes, plus two cross-entity gates: creating
//! or reactivating a training is rejected while the owning athlete is
//! deactivated. Soft-deleting a training stays allowed regardless of the
//! athlete's state: cleanup is never blocked.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::athletes::{check_pagination, get_athlete};
use crate::errors::AppError;
use crate::models::common::Paginated;
use crate::models::training::{NewTraining, TrainingUpdate};
use crate::models::Training;

/// Fetch one training regardless of status.
pub async fn get_training(pool: &SqlitePool, id: i64) -> Result<Training, AppError> {
  sqlx::query_as::<_, Training>("SELECT * FROM trainings WHERE id = ?1")
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("load training", e))?
    .ok_or(AppError::NotFound("training"))
}

async fn ensure_athlete_active(pool: &SqlitePool, athlete_id: i64) -> Result<(), AppError> {
  let athlete = get_athlete(pool, athlete_id).await?;
  if !athlete.is_active() {
    return Err(AppError::conflict(
      "cannot perform this operation on trainings of a deactivated athlete",
    ));
  }
  Ok(())
}

/// Create a new training under an active athlete.
pub async fn create_training(pool: &SqlitePool, payload: NewTraining) -> Result<Training, AppError> {
  payload.validate()?;
  ensure_athlete_active(pool, payload.athlete_id).await?;

  let now = Utc::now();
  let result = sqlx::query(
    r#"
    INSERT INTO trainings (athlete_id, type, duration_minutes, intensity, notes, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
    "#,
  )
  .bind(payload.athlete_id)
  .bind(&payload.training_type)
  .bind(payload.duration_minutes)
  .bind(payload.intensity)
  .bind(&payload.notes)
  .bind(now)
  .execute(pool)
  .await
  .map_err(|e| AppError::database("create training", e))?;

  get_training(pool, result.last_insert_rowid()).await
}

/// List one athlete's trainings, newest first. Historical reads stay
/// available when the athlete is deactivated; only the athlete's existence
/// is checked. Inactive trainings require `include_deleted`.
pub async fn list_trainings_by_athlete(
  pool: &SqlitePool,
  athlete_id: i64,
  page: i64,
  limit: i64,
  include_deleted: bool,
) -> Result<Paginated<Training>, AppError> {
  check_pagination(page, limit)?;
  get_athlete(pool, athlete_id).await?;

  let offset = (page - 1) * limit;
  let status_filter = if include_deleted { "" } else { "AND deleted_at IS NULL" };

  let total_count: i64 = sqlx::query_scalar(&format!(
    "SELECT COUNT(*) FROM trainings WHERE athlete_id = ?1 {}",
    status_filter
  ))
  .bind(athlete_id)
  .fetch_one(pool)
  .await
  .map_err(|e| AppError::database("count trainings", e))?;

  let items = sqlx::query_as::<_, Training>(&format!(
    "SELECT * FROM trainings WHERE athlete_id = ?1 {} ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
    status_filter
  ))
  .bind(athlete_id)
  .bind(limit)
  .bind(offset)
  .fetch_all(pool)
  .await
  .map_err(|e| AppError::database("list trainings", e))?;

  Ok(Paginated::new(items, total_count, page, limit))
}

/// Update an active training of an active athlete.
pub async fn update_training(
  pool: &SqlitePool,
  id: i64,
  payload: TrainingUpdate,
) -> Result<Training, AppError> {
  payload.validate()?;

  let training = get_training(pool, id).await?;
  if !training.is_active() {
    return Err(AppError::conflict("cannot edit a deactivated training"));
  }
  ensure_athlete_active(pool, training.athlete_id).await?;

  let result = sqlx::query(
    r#"
    UPDATE trainings SET
      type = COALESCE(?1, type),
      duration_minutes = COALESCE(?2, duration_minutes),
      intensity = COALESCE(?3, intensity),
      notes = COALESCE(?4, notes),
      updated_at = ?5
    WHERE id = ?6 AND deleted_at IS NULL
    "#,
  )
  .bind(&payload.training_type)
  .bind(payload.duration_minutes)
  .bind(payload.intensity)
  .bind(&payload.notes)
  .bind(Utc::now())
  .bind(id)
  .execute(pool)
  .await
  .map_err(|e| AppError::database("update training", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::conflict("cannot edit a deactivated training"));
  }

  get_training(pool, id).await
}

/// Soft-delete a training. Allowed even when the athlete is deactivated.
pub async fn delete_training(pool: &SqlitePool, id: i64) -> Result<Training, AppError> {
  let training = get_training(pool, id).await?;
  if !training.is_active() {
    return Err(AppError::conflict("training is already deactivated"));
  }

  let result = sqlx::query(
    "UPDATE trainings SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
  )
  .bind(Utc::now())
  .bind(id)
  .execute(pool)
  .await
  .map_err(|e| AppError::database("deactivate training", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::conflict("training is already deactivated"));
  }

  get_training(pool, id).await
}

/// Reactivate a training. Rejected while the owning athlete is inactive:
/// that would resurrect an active training under a deactivated athlete.
pub async fn reactivate_training(pool: &SqlitePool, id: i64) -> Result<Training, AppError> {
  let training = get_training(pool, id).await?;
  if training.is_active() {
    return Err(AppError::conflict("training is already active"));
  }
  ensure_athlete_active(pool, training.athlete_id).await?;

  let result = sqlx::query(
    "UPDATE trainings SET deleted_at = NULL, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NOT NULL",
  )
  .bind(Utc::now())
  .bind(id)
  .execute(pool)
  .await
  .map_err(|e| AppError::database("reactivate training", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::conflict("training is already active"));
  }

  get_training(pool, id).await
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::athletes::{create_athlete, delete_athlete};
  use crate::models::Intensity;
  use crate::test_utils::{new_athlete_payload, new_training_payload, setup_test_db, teardown_test_db};

  async fn seeded_athlete(pool: &SqlitePool) -> i64 {
    create_athlete(pool, new_athlete_payload("Ana Souza", "ana@example.com"))
      .await
      .unwrap()
      .id
  }

  #[tokio::test]
  async fn test_create_training_under_active_athlete() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;

    let training = create_training(&pool, new_training_payload(athlete_id, "Corrida", 30))
      .await
      .unwrap();

    assert!(training.is_active());
    assert_eq!(training.athlete_id, athlete_id);
    assert_eq!(training.training_type, "Corrida");
    assert_eq!(training.intensity, Intensity::Moderate);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_create_training_under_inactive_athlete_is_a_conflict() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;
    delete_athlete(&pool, athlete_id).await.unwrap();

    let err = create_training(&pool, new_training_payload(athlete_id, "Corrida", 30))
      .await
      .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_create_training_for_missing_athlete_is_not_found() {
    let pool = setup_test_db().await;

    let err = create_training(&pool, new_training_payload(42, "Corrida", 30))
      .await
      .unwrap_err();
    assert!(matches!(err, AppError::NotFound("athlete")));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_invalid_duration_rejected_before_touching_db() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;

    let mut payload = new_training_payload(athlete_id, "Corrida", 30);
    payload.duration_minutes = 481;
    let err = create_training(&pool, payload).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_update_only_while_both_sides_active() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;
    let training = create_training(&pool, new_training_payload(athlete_id, "Corrida", 30))
      .await
      .unwrap();

    let updated = update_training(
      &pool,
      training.id,
      TrainingUpdate {
        duration_minutes: Some(45),
        intensity: Some(Intensity::High),
        ..Default::default()
      },
    )
    .await
    .unwrap();
    assert_eq!(updated.duration_minutes, 45);
    assert_eq!(updated.intensity, Intensity::High);
    assert_eq!(updated.training_type, "Corrida");

    // Deactivated training cannot be edited.
    delete_training(&pool, training.id).await.unwrap();
    let err = update_training(
      &pool,
      training.id,
      TrainingUpdate { duration_minutes: Some(60), ..Default::default() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_update_under_inactive_athlete_is_a_conflict() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;
    let training = create_training(&pool, new_training_payload(athlete_id, "Corrida", 30))
      .await
      .unwrap();
    delete_athlete(&pool, athlete_id).await.unwrap();

    let err = update_training(
      &pool,
      training.id,
      TrainingUpdate { duration_minutes: Some(60), ..Default::default() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_delete_training_allowed_under_inactive_athlete() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;
    let training = create_training(&pool, new_training_payload(athlete_id, "Corrida", 30))
      .await
      .unwrap();
    delete_athlete(&pool, athlete_id).await.unwrap();

    // Cleanup is never blocked by the athlete's state.
    let deleted = delete_training(&pool, training.id).await.unwrap();
    assert!(!deleted.is_active());

    // But deleting twice is still a conflict.
    let err = delete_training(&pool, training.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_reactivate_training_gated_by_athlete_state() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;
    let training = create_training(&pool, new_training_payload(athlete_id, "Corrida", 30))
      .await
      .unwrap();

    // Already active → conflict.
    let err = reactivate_training(&pool, training.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    delete_training(&pool, training.id).await.unwrap();
    delete_athlete(&pool, athlete_id).await.unwrap();

    // Athlete inactive → reactivation refused.
    let err = reactivate_training(&pool, training.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Restore the athlete and the training comes back.
    crate::athletes::reactivate_athlete(&pool, athlete_id).await.unwrap();
    let restored = reactivate_training(&pool, training.id).await.unwrap();
    assert!(restored.is_active());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_list_by_athlete_respects_include_deleted() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;

    let first = create_training(&pool, new_training_payload(athlete_id, "Corrida", 30))
      .await
      .unwrap();
    let second = create_training(&pool, new_training_payload(athlete_id, "Natação", 45))
      .await
      .unwrap();
    delete_training(&pool, second.id).await.unwrap();

    let visible = list_trainings_by_athlete(&pool, athlete_id, 1, 10, false)
      .await
      .unwrap();
    assert_eq!(visible.total_count, 1);
    assert_eq!(visible.items[0].id, first.id);

    let all = list_trainings_by_athlete(&pool, athlete_id, 1, 10, true)
      .await
      .unwrap();
    assert_eq!(all.total_count, 2);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_list_for_missing_athlete_is_not_found() {
    let pool = setup_test_db().await;

    let err = list_trainings_by_athlete(&pool, 42, 1, 10, false).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("athlete")));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_historical_listing_survives_athlete_deactivation() {
    let pool = setup_test_db().await;
    let athlete_id = seeded_athlete(&pool).await;
    create_training(&pool, new_training_payload(athlete_id, "Corrida", 30))
      .await
      .unwrap();
    delete_athlete(&pool, athlete_id).await.unwrap();

    let listed = list_trainings_by_athlete(&pool, athlete_id, 1, 10, false)
      .await
      .unwrap();
    assert_eq!(listed.total_count, 1);

    teardown_test_db(pool).await;
  }
}
