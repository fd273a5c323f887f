//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument, warn};

use crate::board::puzzle_board;
use crate::catalog::filter_tools;
use crate::domain::{ProgressUpdate, ToolCategory, UseCase};
use crate::error::AppError;
use crate::grading::grade;
use crate::hints::hint_at;
use crate::protocol::*;
use crate::state::AppState;

pub const CATALOG_SOURCE_HEADER: &str = "x-catalog-source";

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let (status, error) = match &self {
      AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Use case not found"),
      AppError::CatalogUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "Catalog unavailable"),
      AppError::InvalidData(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
      AppError::SaveFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save user progress"),
      AppError::Storage(_) | AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    };
    let body = ErrorOut { error: error.into(), details: Some(self.to_string()), category: None };
    (status, Json(body)).into_response()
  }
}

async fn require_use_case(state: &AppState, id: &str) -> Result<UseCase, AppError> {
  match state.catalog.get_use_case(id).await {
    (Some(uc), _) => Ok(uc),
    (None, origin) => {
      warn!(target: "puzzle", %id, origin = origin.as_str(), "Unknown use case requested");
      Err(AppError::NotFound(id.to_string()))
    }
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { status: "ok" }) }

#[instrument(level = "info", skip(state))]
pub async fn http_test_connection(State(state): State<Arc<AppState>>) -> Response {
  match state.test_connection().await {
    Ok(now) => Json(ConnectionOut {
      connected: true,
      message: format!("Database connection successful ({})", now),
    })
    .into_response(),
    Err(e) => {
      warn!(target: "aipuzzle_backend", error = %e, "Connection probe failed");
      let body = ErrorOut {
        error: "Failed to connect to database".into(),
        details: Some(e.to_string()),
        category: Some(e.category()),
      };
      (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
  }
}

#[instrument(level = "info", skip(state), fields(category = ?q.category, query = ?q.q))]
pub async fn http_list_tools(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ToolsQuery>,
) -> Result<impl IntoResponse, AppError> {
  let category = match q.category.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(c) => Some(
      ToolCategory::parse(c).ok_or_else(|| AppError::InvalidData(format!("unknown category '{}'", c)))?,
    ),
  };
  let (tools, origin) = state.catalog.list_tools().await;
  let tools = filter_tools(&tools, category, q.q.as_deref());
  info!(target: "aipuzzle_backend", count = tools.len(), origin = origin.as_str(), "HTTP tools served");
  Ok(([(CATALOG_SOURCE_HEADER, origin.as_str())], Json(tools)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_use_cases(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (use_cases, origin) = state.catalog.list_use_cases().await;
  info!(target: "aipuzzle_backend", count = use_cases.len(), origin = origin.as_str(), "HTTP use cases served");
  ([(CATALOG_SOURCE_HEADER, origin.as_str())], Json(use_cases))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_use_case(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
  match state.catalog.get_use_case(&id).await {
    (Some(uc), origin) => Ok(([(CATALOG_SOURCE_HEADER, origin.as_str())], Json(uc))),
    (None, _) => Err(AppError::NotFound(id)),
  }
}

#[instrument(level = "info", skip(state), fields(%id, seed = ?q.seed))]
pub async fn http_get_board(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<BoardQuery>,
) -> Result<impl IntoResponse, AppError> {
  let uc = require_use_case(&state, &id).await?;
  let (tools, _) = state.catalog.list_tools().await;
  let mut rng = match q.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };
  let board = puzzle_board(&uc, &tools, &mut rng);
  info!(target: "puzzle", %id, pieces = board.len(), "HTTP board served");
  Ok(Json(board))
}

#[instrument(level = "info", skip(state, body), fields(use_case = %body.use_case_id, selected = body.selection.len()))]
pub async fn http_post_grade(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GradeIn>,
) -> Result<impl IntoResponse, AppError> {
  let uc = require_use_case(&state, &body.use_case_id).await?;
  let g = grade(&uc, &body.selection);
  info!(target: "puzzle", use_case = %uc.id, verdict = ?g.verdict, score = ?g.score, "HTTP selection graded");
  Ok(Json(GradeOut::from(g)))
}

#[instrument(level = "info", skip(state, body), fields(use_case = %body.use_case_id, hints_used = body.hints_used))]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  Json(body): Json<HintIn>,
) -> Result<impl IntoResponse, AppError> {
  let uc = require_use_case(&state, &body.use_case_id).await?;
  let out = HintOut::from_outcome(hint_at(&uc, body.hints_used), body.hints_used);
  info!(target: "puzzle", use_case = %uc.id, hints_used = out.hints_used, exhausted = out.exhausted, "HTTP hint served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(user = %body.user_id, use_case = %body.use_case_id))]
pub async fn http_post_progress(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ProgressUpdate>,
) -> impl IntoResponse {
  let success = state.save_progress(&body).await;
  Json(SaveOut { success })
}

#[instrument(level = "info", skip(state), fields(%user_id))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
  let records = state.load_progress(&user_id).await?;
  info!(target: "puzzle", %user_id, count = records.len(), "HTTP progress served");
  Ok(Json(records))
}
