//! Grading engine: compares a selection against a use case's solution.
//!
//! Pure and deterministic. No I/O, no clock, no randomness.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::UseCase;
use crate::selection::Selection;

pub const POINTS_PER_CORRECT: u32 = 10;
pub const PENALTY_PER_INCORRECT: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
  /// At least one required tool is absent; no score is computed.
  MissingRequired,
  /// Selection equals the solution as a set.
  Perfect,
  /// Some correct tools, but not the exact solution.
  Partial,
  /// Nothing selected is part of the solution.
  #[serde(rename = "NONE")]
  NoMatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
  pub verdict: Verdict,
  /// `None` when the required-tools check failed.
  pub score: Option<u32>,
  pub missing_required: Vec<String>,
  pub correct: Vec<String>,
  pub incorrect: Vec<String>,
}

impl Grade {
  /// Player-facing description of the outcome.
  pub fn message(&self) -> String {
    let score = self.score.unwrap_or(0);
    match self.verdict {
      Verdict::MissingRequired => "You're missing some required tools for this solution!".into(),
      Verdict::Perfect => format!("Perfect solution! You've earned {} points.", score),
      Verdict::Partial => format!(
        "You're on the right track with {} correct tools, but your solution isn't optimal yet. Score: {}",
        self.correct.len(),
        score
      ),
      Verdict::NoMatch => {
        "None of your selected tools are part of the optimal solution. Try again!".into()
      }
    }
  }
}

/// Score a selection against a use case.
pub fn grade(use_case: &UseCase, selection: &Selection) -> Grade {
  let missing_required: Vec<String> = use_case
    .required_tools
    .iter()
    .filter(|id| !selection.contains(id))
    .cloned()
    .collect();

  if !missing_required.is_empty() {
    return Grade {
      verdict: Verdict::MissingRequired,
      score: None,
      missing_required,
      correct: vec![],
      incorrect: vec![],
    };
  }

  let solution: HashSet<&str> = use_case.solution.iter().map(String::as_str).collect();
  let (correct, incorrect): (Vec<&str>, Vec<&str>) =
    selection.iter().partition(|id| solution.contains(id));

  let earned = POINTS_PER_CORRECT * correct.len() as u32;
  let penalty = PENALTY_PER_INCORRECT * incorrect.len() as u32;
  let score = earned.saturating_sub(penalty);

  let verdict = if solution.len() == correct.len() && incorrect.is_empty() {
    Verdict::Perfect
  } else if !correct.is_empty() {
    Verdict::Partial
  } else {
    Verdict::NoMatch
  };

  Grade {
    verdict,
    score: Some(score),
    missing_required,
    correct: correct.into_iter().map(String::from).collect(),
    incorrect: incorrect.into_iter().map(String::from).collect(),
  }
}
