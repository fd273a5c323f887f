//! Domain models: catalog tools, puzzle use cases, and persisted progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of thing a catalog tool is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
  Language,
  Framework,
  Tool,
  Model,
}

impl ToolCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      ToolCategory::Language => "language",
      ToolCategory::Framework => "framework",
      ToolCategory::Tool => "tool",
      ToolCategory::Model => "model",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "language" => Some(ToolCategory::Language),
      "framework" => Some(ToolCategory::Framework),
      "tool" => Some(ToolCategory::Tool),
      "model" => Some(ToolCategory::Model),
      _ => None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
  Beginner,
  Intermediate,
  Advanced,
}

impl Complexity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Complexity::Beginner => "beginner",
      Complexity::Intermediate => "intermediate",
      Complexity::Advanced => "advanced",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "beginner" => Some(Complexity::Beginner),
      "intermediate" => Some(Complexity::Intermediate),
      "advanced" => Some(Complexity::Advanced),
      _ => None,
    }
  }
}

/// Puzzle difficulty. Declaration order is the presentation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "easy" => Some(Difficulty::Easy),
      "medium" => Some(Difficulty::Medium),
      "hard" => Some(Difficulty::Hard),
      _ => None,
    }
  }
}

/// A catalog entry: an AI model, framework or library.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
  pub id: String,
  pub name: String,
  pub description: String,
  pub category: ToolCategory,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
  #[serde(default)]
  pub capabilities: Vec<String>,
  pub complexity: Complexity,
}

/// A puzzle definition. Tool references are ids into the catalog and may dangle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCase {
  pub id: String,
  pub title: String,
  pub description: String,
  pub difficulty: Difficulty,
  #[serde(default)]
  pub required_tools: Vec<String>,
  #[serde(default)]
  pub optional_tools: Vec<String>,
  #[serde(default)]
  pub hints: Vec<String>,
  #[serde(default)]
  pub solution: Vec<String>,
}

/// Stable presentation order: difficulty rank, then title.
pub fn sort_use_cases(use_cases: &mut [UseCase]) {
  use_cases.sort_by(|a, b| {
    a.difficulty
      .cmp(&b.difficulty)
      .then_with(|| a.title.cmp(&b.title))
  });
}

/// Payload of a progress save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
  pub user_id: String,
  pub use_case_id: String,
  pub score: u32,
  pub hints_used: u32,
  pub completed: bool,
}

/// Best score ever per (user, use case); the other fields reflect the latest save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
  pub user_id: String,
  pub use_case_id: String,
  pub title: String,
  pub score: u32,
  pub hints_used: u32,
  pub completed: bool,
  pub last_played: DateTime<Utc>,
}

/// Where a catalog answer came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrigin {
  Store,
  Fallback,
}

impl CatalogOrigin {
  pub fn as_str(&self) -> &'static str {
    match self {
      CatalogOrigin::Store => "store",
      CatalogOrigin::Fallback => "fallback",
    }
  }
}
