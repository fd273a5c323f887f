//! The user's in-progress pick of tools for one play-through.

use serde::{Deserialize, Serialize};

/// Insertion-ordered set of tool ids. Duplicates are impossible by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Selection {
  ids: Vec<String>,
}

impl Selection {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns false if the tool was already selected.
  pub fn add(&mut self, tool_id: impl Into<String>) -> bool {
    let tool_id = tool_id.into();
    if self.contains(&tool_id) {
      return false;
    }
    self.ids.push(tool_id);
    true
  }

  /// Returns false if the tool was not selected.
  pub fn remove(&mut self, tool_id: &str) -> bool {
    let before = self.ids.len();
    self.ids.retain(|id| id != tool_id);
    self.ids.len() != before
  }

  pub fn clear(&mut self) {
    self.ids.clear();
  }

  pub fn contains(&self, tool_id: &str) -> bool {
    self.ids.iter().any(|id| id == tool_id)
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.ids.iter().map(String::as_str)
  }
}

impl<S: Into<String>> FromIterator<S> for Selection {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let mut sel = Selection::new();
    for id in iter {
      sel.add(id);
    }
    sel
  }
}

impl From<Vec<String>> for Selection {
  fn from(ids: Vec<String>) -> Self {
    ids.into_iter().collect()
  }
}

impl From<Selection> for Vec<String> {
  fn from(sel: Selection) -> Self {
    sel.ids
  }
}
