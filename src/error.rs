//! Error taxonomy shared by the store, the HTTP client and the route layer.
//!
//! Grading and hint outcomes are not errors; they are verdict values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("use case not found: {0}")]
  NotFound(String),

  #[error("catalog unavailable: {0}")]
  CatalogUnavailable(String),

  #[error("failed to save progress: {0}")]
  SaveFailed(String),

  #[error("storage error: {0}")]
  Storage(#[from] rusqlite::Error),

  #[error("invalid data: {0}")]
  InvalidData(String),

  #[error("configuration error: {0}")]
  Config(String),
}

impl From<reqwest::Error> for AppError {
  fn from(e: reqwest::Error) -> Self {
    AppError::CatalogUnavailable(e.to_string())
  }
}

impl AppError {
  /// Coarse category used by the connectivity probe.
  pub fn category(&self) -> &'static str {
    match self {
      AppError::NotFound(_) => "not_found",
      AppError::CatalogUnavailable(_) => "network",
      AppError::SaveFailed(_) => "save",
      AppError::Storage(_) => "database",
      AppError::InvalidData(_) => "data",
      AppError::Config(_) => "config",
    }
  }
}
