//! One play-through of a puzzle: selection, hints, running score.

use tracing::{debug, info};

use crate::domain::{ProgressUpdate, UseCase};
use crate::grading::{grade, Grade, Verdict};
use crate::hints::{HintDispenser, HintOutcome};
use crate::selection::Selection;

#[derive(Clone, Debug)]
pub struct PlaySession {
  use_case: UseCase,
  selection: Selection,
  hints: HintDispenser,
  score: u32,
  complete: bool,
}

impl PlaySession {
  pub fn new(use_case: UseCase) -> Self {
    Self {
      use_case,
      selection: Selection::new(),
      hints: HintDispenser::new(),
      score: 0,
      complete: false,
    }
  }

  pub fn use_case(&self) -> &UseCase {
    &self.use_case
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  pub fn hints_used(&self) -> u32 {
    self.hints.hints_used()
  }

  pub fn is_complete(&self) -> bool {
    self.complete
  }

  pub fn add_tool(&mut self, tool_id: &str) -> bool {
    self.selection.add(tool_id)
  }

  pub fn remove_tool(&mut self, tool_id: &str) -> bool {
    self.selection.remove(tool_id)
  }

  pub fn next_hint(&mut self) -> HintOutcome {
    let outcome = self.hints.next_hint(&self.use_case);
    debug!(target: "puzzle", use_case = %self.use_case.id, hints_used = self.hints.hints_used(), exhausted = matches!(outcome, HintOutcome::Exhausted), "Hint requested");
    outcome
  }

  /// Grade the current selection. Perfect and partial answers replace the
  /// running score; a perfect answer completes the session.
  pub fn check(&mut self) -> Grade {
    let g = grade(&self.use_case, &self.selection);
    match g.verdict {
      Verdict::Perfect | Verdict::Partial => {
        self.score = g.score.unwrap_or(self.score);
        self.complete = g.verdict == Verdict::Perfect;
      }
      Verdict::MissingRequired | Verdict::NoMatch => {}
    }
    info!(target: "puzzle", use_case = %self.use_case.id, verdict = ?g.verdict, score = self.score, "Selection checked");
    g
  }

  pub fn reset(&mut self) {
    self.selection.clear();
    self.hints = HintDispenser::new();
    self.score = 0;
    self.complete = false;
  }

  pub fn progress_update(&self, user_id: &str) -> ProgressUpdate {
    ProgressUpdate {
      user_id: user_id.to_string(),
      use_case_id: self.use_case.id.clone(),
      score: self.score,
      hints_used: self.hints.hints_used(),
      completed: self.complete,
    }
  }
}
