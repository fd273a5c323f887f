//! Hint dispenser: reveals a use case's hints strictly in stored order.

use crate::domain::UseCase;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HintOutcome {
  Hint(String),
  /// Every hint has been shown; the counter does not advance.
  Exhausted,
}

/// Hint lookup for a caller that tracks the counter itself.
pub fn hint_at(use_case: &UseCase, hints_used: u32) -> HintOutcome {
  match use_case.hints.get(hints_used as usize) {
    Some(text) => HintOutcome::Hint(text.clone()),
    None => HintOutcome::Exhausted,
  }
}

/// Per play-through counter.
#[derive(Clone, Debug, Default)]
pub struct HintDispenser {
  used: u32,
}

impl HintDispenser {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn hints_used(&self) -> u32 {
    self.used
  }

  pub fn next_hint(&mut self, use_case: &UseCase) -> HintOutcome {
    let outcome = hint_at(use_case, self.used);
    if matches!(outcome, HintOutcome::Hint(_)) {
      self.used += 1;
    }
    outcome
  }
}
