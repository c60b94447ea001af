mod athletes;
mod commands;
mod dates;
mod db;
mod errors;
mod insights;
mod models;
mod recommendations;
mod report;
mod trainings;

#[cfg(test)]
mod test_utils;

use db::AppState;
use std::sync::Arc;
use tauri::Manager;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  tauri::Builder::default()
    .plugin(tauri_plugin_opener::init())
    .setup(|app| {
      // Initialize database
      let app_handle = app.handle().clone();
      tauri::async_runtime::block_on(async move {
        match db::initialize_db(&app_handle).await {
          Ok(pool) => {
            let state = Arc::new(AppState { db: pool });
            app_handle.manage(state);
          }
          Err(e) => {
            error!("failed to initialize database: {}", e);
          }
        }
      });
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      // Athlete commands
      commands::athletes::get_athlete,
      commands::athletes::create_athlete,
      commands::athletes::list_athletes,
      commands::athletes::update_athlete,
      commands::athletes::delete_athlete,
      commands::athletes::reactivate_athlete,
      // Training commands
      commands::trainings::get_training,
      commands::trainings::create_training,
      commands::trainings::list_trainings_by_athlete,
      commands::trainings::update_training,
      commands::trainings::delete_training,
      commands::trainings::reactivate_training,
      // Insights commands
      commands::insights::get_athlete_insights,
      commands::insights::get_recommendations,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
