//! Error taxonomy shared by the command layer
//!
//! Commands return `Result<T, AppError>`; the manual Serialize impl turns
//! errors into plain strings at the invoke boundary so the frontend can show
//! them directly.

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// The id does not resolve to any row, active or inactive.
  #[error("{0} not found")]
  NotFound(&'static str),

  /// State-machine violation or uniqueness conflict.
  #[error("{0}")]
  Conflict(String),

  /// Malformed or out-of-range input, rejected before any SQL runs.
  #[error("{0}")]
  Validation(String),

  /// The database could not be reached at all.
  #[error("could not reach the database: {source}")]
  Connection {
    #[source]
    source: sqlx::Error,
  },

  /// Unexpected persistence failure, original cause preserved.
  #[error("failed to {operation}: {source}")]
  Database {
    operation: &'static str,
    #[source]
    source: sqlx::Error,
  },
}

impl AppError {
  pub fn conflict(message: impl Into<String>) -> Self {
    Self::Conflict(message.into())
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  /// Wrap a sqlx error with the name of the failed operation, translating
  /// unique-constraint violations into a domain-level conflict instead of
  /// leaking the raw storage error.
  pub fn database(operation: &'static str, source: sqlx::Error) -> Self {
    if is_unique_violation(&source) {
      return Self::Conflict("an athlete with this email already exists".to_string());
    }
    tracing::error!(operation, error = %source, "database operation failed");
    if is_connection_error(&source) {
      return Self::Connection { source };
    }
    Self::Database { operation, source }
  }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
  matches!(
    error,
    sqlx::Error::Database(db) if db.is_unique_violation()
  )
}

fn is_connection_error(error: &sqlx::Error) -> bool {
  matches!(
    error,
    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
  )
}

impl Serialize for AppError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_messages_carry_operation_context() {
    let err = AppError::Database {
      operation: "create athlete",
      source: sqlx::Error::RowNotFound,
    };
    assert!(err.to_string().starts_with("failed to create athlete"));
  }

  #[test]
  fn test_serializes_to_message_string() {
    let err = AppError::conflict("athlete is already deactivated");
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(json, "\"athlete is already deactivated\"");
  }
}
