//! Public HTTP request/response DTOs (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::grading::{Grade, Verdict};
use crate::hints::HintOutcome;
use crate::selection::Selection;

#[derive(Debug, Deserialize)]
pub struct ToolsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeIn {
    pub use_case_id: String,
    #[serde(default)]
    pub selection: Selection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOut {
    pub verdict: Verdict,
    pub score: Option<u32>,
    pub missing_required: Vec<String>,
    pub correct: Vec<String>,
    pub incorrect: Vec<String>,
    pub message: String,
}

impl From<Grade> for GradeOut {
    fn from(g: Grade) -> Self {
        let message = g.message();
        GradeOut {
            verdict: g.verdict,
            score: g.score,
            missing_required: g.missing_required,
            correct: g.correct,
            incorrect: g.incorrect,
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintIn {
    pub use_case_id: String,
    #[serde(default)]
    pub hints_used: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HintOut {
    pub hint: Option<String>,
    /// Counter after this request.
    pub hints_used: u32,
    pub exhausted: bool,
    pub message: String,
}

impl HintOut {
    pub fn from_outcome(outcome: HintOutcome, hints_used_before: u32) -> Self {
        match outcome {
            HintOutcome::Hint(text) => HintOut {
                message: format!("Hint: {}", text),
                hint: Some(text),
                hints_used: hints_used_before + 1,
                exhausted: false,
            },
            HintOutcome::Exhausted => HintOut {
                hint: None,
                hints_used: hints_used_before,
                exhausted: true,
                message: "You've used all available hints!".into(),
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SaveOut {
    pub success: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ConnectionOut {
    pub connected: bool,
    pub message: String,
}

/// Error body shared by all failing endpoints.
#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
}
