//! Tauri commands for athlete CRUD
//!
//! Thin wrappers over the `athletes` service module; every state-machine
//! rule lives there.

use std::sync::Arc;
use tauri::State;

use crate::athletes;
use crate::athletes::DEFAULT_PAGE_SIZE;
use crate::db::AppState;
use crate::errors::AppError;
use crate::models::athlete::{AthleteUpdate, NewAthlete};
use crate::models::common::{Mutation, Paginated};
use crate::models::Athlete;

/// Fetch an athlete regardless of status (detail, audit and reactivation
/// views need inactive rows too).
#[tauri::command]
pub async fn get_athlete(
  state: State<'_, Arc<AppState>>,
  id: i64,
) -> Result<Athlete, AppError> {
  athletes::get_athlete(&state.db, id).await
}

#[tauri::command]
pub async fn create_athlete(
  state: State<'_, Arc<AppState>>,
  data: NewAthlete,
) -> Result<Mutation<Athlete>, AppError> {
  athletes::create_athlete(&state.db, data).await.map(Mutation::of)
}

#[tauri::command]
pub async fn list_athletes(
  state: State<'_, Arc<AppState>>,
  page: Option<i64>,
  limit: Option<i64>,
  include_deleted: Option<bool>,
) -> Result<Paginated<Athlete>, AppError> {
  athletes::list_athletes(
    &state.db,
    page.unwrap_or(1),
    limit.unwrap_or(DEFAULT_PAGE_SIZE),
    include_deleted.unwrap_or(false),
  )
  .await
}

#[tauri::command]
pub async fn update_athlete(
  state: State<'_, Arc<AppState>>,
  id: i64,
  data: AthleteUpdate,
) -> Result<Mutation<Athlete>, AppError> {
  athletes::update_athlete(&state.db, id, data).await.map(Mutation::of)
}

/// Soft-delete an athlete.
#[tauri::command]
pub async fn delete_athlete(
  state: State<'_, Arc<AppState>>,
  id: i64,
) -> Result<Mutation<Athlete>, AppError> {
  athletes::delete_athlete(&state.db, id).await.map(Mutation::of)
}

#[tauri::command]
pub async fn reactivate_athlete(
  state: State<'_, Arc<AppState>>,
  id: i64,
) -> Result<Mutation<Athlete>, AppError> {
  athletes::reactivate_athlete(&state.db, id).await.map(Mutation::of)
}
