//! Athlete CRUD with the active/inactive lifecycle
//!
//! Rows are never physically removed: deleting sets `deleted_at`, and
//! reactivation clears it. Allowed transitions:
//!   create     → always active
//!   update     → only while active, CONFLICT otherwise
//!   delete     → active → inactive, CONFLICT when already inactive
//!   reactivate → inactive → active, CONFLICT when already active
//!   get        → any status (detail views and reactivation need it)
//!   list       → active only by default, everything with include_deleted
//!
//! Mutations guard the transition inside the UPDATE itself
//! (`WHERE ... AND deleted_at IS NULL`), so a concurrent second mutation
//! between our read and write cannot break the state machine.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::athlete::{AthleteUpdate, NewAthlete};
use crate::models::common::Paginated;
use crate::models::Athlete;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

pub(crate) fn check_pagination(page: i64, limit: i64) -> Result<(), AppError> {
  if page < 1 {
    return Err(AppError::validation("page must be a positive number"));
  }
  if limit < 1 || limit > MAX_PAGE_SIZE {
    return Err(AppError::validation(format!(
      "limit must be between 1 and {}",
      MAX_PAGE_SIZE
    )));
  }
  Ok(())
}

/// Fetch one athlete regardless of status.
pub async fn get_athlete(pool: &SqlitePool, id: i64) -> Result<Athlete, AppError> {
  sqlx::query_as::<_, Athlete>("SELECT * FROM athletes WHERE id = ?1")
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("load athlete", e))?
    .ok_or(AppError::NotFound("athlete"))
}

/// Create a new athlete; always enters the active state.
pub async fn create_athlete(pool: &SqlitePool, payload: NewAthlete) -> Result<Athlete, AppError> {
  let now = Utc::now();
  payload.validate(now.date_naive())?;

  let result = sqlx::query(
    r#"
    INSERT INTO athletes (name, email, date_of_birth, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?4)
    "#,
  )
  .bind(&payload.name)
  .bind(&payload.email)
  .bind(payload.date_of_birth)
  .bind(now)
  .execute(pool)
  .await
  .map_err(|e| AppError::database("create athlete", e))?;

  get_athlete(pool, result.last_insert_rowid()).await
}

/// List athletes, newest first. Inactive rows (and their counts) only show
/// up when `include_deleted` is set.
pub async fn list_athletes(
  pool: &SqlitePool,
  page: i64,
  limit: i64,
  include_deleted: bool,
) -> Result<Paginated<Athlete>, AppError> {
  check_pagination(page, limit)?;
  let offset = (page - 1) * limit;

  let status_filter = if include_deleted { "" } else { "WHERE deleted_at IS NULL" };

  let total_count: i64 =
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM athletes {}", status_filter))
      .fetch_one(pool)
      .await
      .map_err(|e| AppError::database("count athletes", e))?;

  let items = sqlx::query_as::<_, Athlete>(&format!(
    "SELECT * FROM athletes {} ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
    status_filter
  ))
  .bind(limit)
  .bind(offset)
  .fetch_all(pool)
  .await
  .map_err(|e| AppError::database("list athletes", e))?;

  Ok(Paginated::new(items, total_count, page, limit))
}

/// Update an active athlete; absent fields are left as they are.
pub async fn update_athlete(
  pool: &SqlitePool,
  id: i64,
  payload: AthleteUpdate,
) -> Result<Athlete, AppError> {
  let now = Utc::now();
  payload.validate(now.date_naive())?;

  let athlete = get_athlete(pool, id).await?;
  if !athlete.is_active() {
    return Err(AppError::conflict("cannot edit a deactivated athlete"));
  }

  let result = sqlx::query(
    r#"
    UPDATE athletes SET
      name = COALESCE(?1, name),
      email = COALESCE(?2, email),
      date_of_birth = COALESCE(?3, date_of_birth),
      updated_at = ?4
    WHERE id = ?5 AND deleted_at IS NULL
    "#,
  )
  .bind(&payload.name)
  .bind(&payload.email)
  .bind(payload.date_of_birth)
  .bind(now)
  .bind(id)
  .execute(pool)
  .await
  .map_err(|e| AppError::database("update athlete", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::conflict("cannot edit a deactivated athlete"));
  }

  get_athlete(pool, id).await
}

/// Soft-delete: mark the athlete inactive.
pub async fn delete_athlete(pool: &SqlitePool, id: i64) -> Result<Athlete, AppError> {
  let athlete = get_athlete(pool, id).await?;
  if !athlete.is_active() {
    return Err(AppError::conflict("athlete is already deactivated"));
  }

  let result = sqlx::query(
    "UPDATE athletes SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
  )
  .bind(Utc::now())
  .bind(id)
  .execute(pool)
  .await
  .map_err(|e| AppError::database("deactivate athlete", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::conflict("athlete is already deactivated"));
  }

  get_athlete(pool, id).await
}

/// Clear the soft-delete marker on an inactive athlete.
pub async fn reactivate_athlete(pool: &SqlitePool, id: i64) -> Result<Athlete, AppError> {
  let athlete = get_athlete(pool, id).await?;
  if athlete.is_active() {
    return Err(AppError::conflict("athlete is already active"));
  }

  let result = sqlx::query(
    "UPDATE athletes SET deleted_at = NULL, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NOT NULL",
  )
  .bind(Utc::now())
  .bind(id)
  .execute(pool)
  .await
  .map_err(|e| AppError::database("reactivate athlete", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::conflict("athlete is already active"));
  }

  get_athlete(pool, id).await
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
