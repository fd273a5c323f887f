//! Runtime configuration from environment variables, plus an optional TOML
//! catalog bank that replaces the built-in static catalog.
//!
//! Environment:
//!   PORT                : u16 (default 3001)
//!   DATABASE_PATH       : SQLite file (default "aipuzzle.db"; ":memory:" for a throwaway store)
//!   CATALOG_CONFIG_PATH : TOML catalog bank (tools + use cases)
//!   CATALOG_RESEED      : "true"/"1"/"yes" (any case) replaces the stored catalog at startup
//!   STATIC_DIR          : SPA directory (default "./static")

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{Difficulty, Tool, UseCase};
use crate::error::AppError;

pub const DEFAULT_PORT: u16 = 3001;
pub const IN_MEMORY_DB: &str = ":memory:";

#[derive(Clone, Debug)]
pub struct AppConfig {
  pub port: u16,
  pub database_path: String,
  pub catalog_path: Option<PathBuf>,
  pub reseed: bool,
  pub static_dir: PathBuf,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      database_path: "aipuzzle.db".into(),
      catalog_path: None,
      reseed: false,
      static_dir: PathBuf::from("./static"),
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Self {
    let defaults = Self::default();
    let port = match std::env::var("PORT") {
      Ok(p) => p.parse::<u16>().unwrap_or_else(|_| {
        warn!(target: "aipuzzle_backend", value = %p, "Invalid PORT; using default");
        defaults.port
      }),
      Err(_) => defaults.port,
    };
    Self {
      port,
      database_path: std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
      catalog_path: std::env::var("CATALOG_CONFIG_PATH").ok().map(PathBuf::from),
      reseed: std::env::var("CATALOG_RESEED")
        .map(|v| parse_flag(&v).unwrap_or_else(|| {
          warn!(target: "aipuzzle_backend", value = %v, "Invalid CATALOG_RESEED; not reseeding");
          false
        }))
        .unwrap_or(defaults.reseed),
      static_dir: std::env::var("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or(defaults.static_dir),
    }
  }
}

/// Boolean env value, case-insensitive. `None` for anything unrecognised.
pub fn parse_flag(raw: &str) -> Option<bool> {
  match raw.trim().to_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" | "" => Some(false),
    _ => None,
  }
}

/// Catalog bank accepted in TOML:
///
/// ```toml
/// [[tools]]
/// id = "pytorch"
/// name = "PyTorch"
/// description = "..."
/// category = "framework"
/// complexity = "advanced"
/// capabilities = ["neural networks"]
///
/// [[use_cases]]
/// title = "..."
/// description = "..."
/// difficulty = "easy"
/// requiredTools = ["pytorch"]
/// solution = ["pytorch"]
/// ```
#[derive(Clone, Debug, Deserialize, Default)]
pub struct CatalogConfig {
  #[serde(default)]
  pub tools: Vec<Tool>,
  #[serde(default)]
  pub use_cases: Vec<UseCaseCfg>,
}

/// Use case entry; a missing id is derived from the title (UUID v5), so it
/// stays the same across restarts and matches what the store was seeded with.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCaseCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub description: String,
  pub difficulty: Difficulty,
  #[serde(default)] pub required_tools: Vec<String>,
  #[serde(default)] pub optional_tools: Vec<String>,
  #[serde(default)] pub hints: Vec<String>,
  #[serde(default)] pub solution: Vec<String>,
}

impl CatalogConfig {
  pub fn parse(raw: &str) -> Result<Self, AppError> {
    toml::from_str::<CatalogConfig>(raw).map_err(|e| AppError::Config(e.to_string()))
  }

  pub fn into_catalog(self) -> (Vec<Tool>, Vec<UseCase>) {
    let use_cases = self
      .use_cases
      .into_iter()
      .map(|cc| UseCase {
        id: cc
          .id
          .unwrap_or_else(|| Uuid::new_v5(&Uuid::NAMESPACE_OID, cc.title.as_bytes()).to_string()),
        title: cc.title,
        description: cc.description,
        difficulty: cc.difficulty,
        required_tools: cc.required_tools,
        optional_tools: cc.optional_tools,
        hints: cc.hints,
        solution: cc.solution,
      })
      .collect();
    (self.tools, use_cases)
  }
}

/// Read and parse the catalog bank. On any IO/parse error, logs and returns None.
pub fn load_catalog_config(path: &Path) -> Option<CatalogConfig> {
  let shown = path.display().to_string();
  match std::fs::read_to_string(path) {
    Ok(s) => match CatalogConfig::parse(&s) {
      Ok(cfg) => {
        info!(target: "aipuzzle_backend", path = %shown, tools = cfg.tools.len(), use_cases = cfg.use_cases.len(), "Loaded catalog bank (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "aipuzzle_backend", path = %shown, error = %e, "Failed to parse catalog TOML");
        None
      }
    },
    Err(e) => {
      error!(target: "aipuzzle_backend", path = %shown, error = %e, "Failed to read catalog TOML");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ToolCategory;

  const BANK: &str = r#"
[[tools]]
id = "pytorch"
name = "PyTorch"
description = "Deep learning library"
category = "framework"
complexity = "advanced"
capabilities = ["neural networks"]

[[use_cases]]
id = "vision"
title = "Vision"
difficulty = "hard"
requiredTools = ["pytorch"]
hints = ["Think tensors"]
solution = ["pytorch"]

[[use_cases]]
title = "Anonymous"
difficulty = "easy"
"#;

  #[test]
  fn parses_bank_and_fills_missing_ids() {
    let (tools, use_cases) = CatalogConfig::parse(BANK).unwrap().into_catalog();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].category, ToolCategory::Framework);
    assert_eq!(use_cases[0].id, "vision");
    assert_eq!(use_cases[0].required_tools, vec!["pytorch"]);
    assert!(!use_cases[1].id.is_empty());
    assert!(use_cases[1].solution.is_empty());
  }

  #[test]
  fn derived_ids_are_stable_across_loads() {
    let (_, first) = CatalogConfig::parse(BANK).unwrap().into_catalog();
    let (_, second) = CatalogConfig::parse(BANK).unwrap().into_catalog();
    assert_eq!(first[1].id, second[1].id);
    assert_ne!(first[1].id, first[0].id);
  }

  #[test]
  fn reseed_flag_ignores_case() {
    assert_eq!(parse_flag("TRUE"), Some(true));
    assert_eq!(parse_flag(" Yes "), Some(true));
    assert_eq!(parse_flag("1"), Some(true));
    assert_eq!(parse_flag("False"), Some(false));
    assert_eq!(parse_flag("sometimes"), None);
  }

  #[test]
  fn bad_difficulty_is_a_config_error() {
    let raw = "[[use_cases]]\ntitle = \"X\"\ndifficulty = \"extreme\"\n";
    assert!(matches!(CatalogConfig::parse(raw), Err(AppError::Config(_))));
  }
}
