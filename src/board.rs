//! Puzzle board composition: the relevant tools plus a few red herrings, shuffled.
//!
//! Randomness is injected so callers (and tests) can seed it.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{Tool, UseCase};

pub const RED_HERRING_COUNT: usize = 3;

/// Required and optional tools that exist in `tools`, plus up to
/// `RED_HERRING_COUNT` unrelated tools, in random order.
pub fn puzzle_board<R: Rng + ?Sized>(use_case: &UseCase, tools: &[Tool], rng: &mut R) -> Vec<Tool> {
  let relevant: HashSet<&str> = use_case
    .required_tools
    .iter()
    .chain(use_case.optional_tools.iter())
    .map(String::as_str)
    .collect();

  let (mut board, others): (Vec<&Tool>, Vec<&Tool>) =
    tools.iter().partition(|t| relevant.contains(t.id.as_str()));

  board.extend(others.choose_multiple(rng, RED_HERRING_COUNT).copied());
  board.shuffle(rng);
  board.into_iter().cloned().collect()
}
