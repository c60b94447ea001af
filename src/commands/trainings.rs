//! Tauri commands for training CRUD

use std::sync::Arc;
use tauri::State;

use crate::athletes::DEFAULT_PAGE_SIZE;
use crate::db::AppState;
use crate::errors::AppError;
use crate::models::common::{Mutation, Paginated};
use crate::models::training::{NewTraining, TrainingUpdate};
use crate::models::Training;
use crate::trainings;

/// Fetch a training regardless of status.
#[tauri::command]
pub async fn get_training(
  state: State<'_, Arc<AppState>>,
  id: i64,
) -> Result<Training, AppError> {
  trainings::get_training(&state.db, id).await
}

#[tauri::command]
pub async fn create_training(
  state: State<'_, Arc<AppState>>,
  data: NewTraining,
) -> Result<Mutation<Training>, AppError> {
  trainings::create_training(&state.db, data).await.map(Mutation::of)
}

#[tauri::command]
pub async fn list_trainings_by_athlete(
  state: State<'_, Arc<AppState>>,
  athlete_id: i64,
  page: Option<i64>,
  limit: Option<i64>,
  include_deleted: Option<bool>,
) -> Result<Paginated<Training>, AppError> {
  trainings::list_trainings_by_athlete(
    &state.db,
    athlete_id,
    page.unwrap_or(1),
    limit.unwrap_or(DEFAULT_PAGE_SIZE),
    include_deleted.unwrap_or(false),
  )
  .await
}

#[tauri::command]
pub async fn update_training(
  state: State<'_, Arc<AppState>>,
  id: i64,
  data: TrainingUpdate,
) -> Result<Mutation<Training>, AppError> {
  trainings::update_training(&state.db, id, data).await.map(Mutation::of)
}

/// Soft-delete a training. Allowed even under a deactivated athlete.
#[tauri::command]
pub async fn delete_training(
  state: State<'_, Arc<AppState>>,
  id: i64,
) -> Result<Mutation<Training>, AppError> {
  trainings::delete_training(&state.db, id).await.map(Mutation::of)
}

#[tauri::command]
pub async fn reactivate_training(
  state: State<'_, Arc<AppState>>,
  id: i64,
) -> Result<Mutation<Training>, AppError> {
  trainings::reactivate_training(&state.db, id).await.map(Mutation::of)
}
