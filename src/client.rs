//! HTTP client for the puzzle API, used by presentation layers.
//!
//! Wrap it in `FallbackCatalog<ApiClient>` to get the built-in catalog when the
//! backend cannot be reached.

use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::catalog::CatalogQuery;
use crate::domain::{ProgressRecord, ProgressUpdate, Tool, UseCase};
use crate::error::AppError;
use crate::protocol::SaveOut;
use crate::store::ProgressStore;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

#[derive(Clone)]
pub struct ApiClient {
  pub client: reqwest::Client,
  pub base_url: Url,
}

#[derive(Deserialize)]
struct ProbeOut {
  #[serde(default)]
  connected: bool,
  #[serde(default)]
  details: Option<String>,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self, AppError> {
    let base_url = Url::parse(base_url.trim_end_matches('/'))
      .map_err(|e| AppError::Config(format!("invalid API url '{}': {}", base_url, e)))?;
    if base_url.cannot_be_a_base() {
      return Err(AppError::Config(format!("API url '{}' cannot take a path", base_url)));
    }
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| AppError::Config(e.to_string()))?;
    Ok(Self { client, base_url })
  }

  /// Base URL from PUZZLE_API_URL, defaulting to a local backend.
  pub fn from_env() -> Result<Self, AppError> {
    let url = std::env::var("PUZZLE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
    Self::new(&url)
  }

  /// Base URL plus path segments, each percent-encoded on its own.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  async fn get(&self, segments: &[&str]) -> Result<reqwest::Response, AppError> {
    let res = self
      .client
      .get(self.url(segments))
      .header(USER_AGENT, "aipuzzle-client/0.1")
      .send()
      .await?;
    Ok(res)
  }

  async fn get_json<T: for<'a> Deserialize<'a>>(&self, segments: &[&str]) -> Result<T, AppError> {
    let res = self.get(segments).await?;
    if !res.status().is_success() {
      let status = res.status();
      let url = res.url().to_string();
      let body = res.text().await.unwrap_or_default();
      return Err(AppError::CatalogUnavailable(format!("HTTP {} from {}: {}", status, url, body)));
    }
    Ok(res.json::<T>().await?)
  }

  /// Ask the backend whether its database is reachable.
  #[instrument(level = "info", skip(self))]
  pub async fn test_connection(&self) -> Result<(), AppError> {
    let res = self.get(&["test-connection"]).await?;
    let status = res.status();
    let probe: ProbeOut = res.json().await?;
    if status.is_success() && probe.connected {
      Ok(())
    } else {
      let details = probe.details.unwrap_or_else(|| format!("HTTP {}", status));
      error!(target: "aipuzzle_backend", %details, "Backend reports database unavailable");
      Err(AppError::CatalogUnavailable(details))
    }
  }
}

impl CatalogQuery for ApiClient {
  #[instrument(level = "debug", skip(self))]
  async fn list_tools(&self) -> Result<Vec<Tool>, AppError> {
    self.get_json(&["tools"]).await
  }

  #[instrument(level = "debug", skip(self))]
  async fn list_use_cases(&self) -> Result<Vec<UseCase>, AppError> {
    self.get_json(&["use-cases"]).await
  }

  #[instrument(level = "debug", skip(self))]
  async fn get_use_case(&self, id: &str) -> Result<Option<UseCase>, AppError> {
    let res = self.get(&["use-cases", id]).await?;
    match res.status() {
      StatusCode::NOT_FOUND => Ok(None),
      s if s.is_success() => Ok(Some(res.json::<UseCase>().await?)),
      s => Err(AppError::CatalogUnavailable(format!("HTTP {} fetching use case {}", s, id))),
    }
  }
}

impl ProgressStore for ApiClient {
  #[instrument(level = "info", skip(self, update), fields(user = %update.user_id, use_case = %update.use_case_id))]
  async fn save_progress(&self, update: &ProgressUpdate) -> Result<(), AppError> {
    let res = self
      .client
      .post(self.url(&["user-progress"]))
      .header(USER_AGENT, "aipuzzle-client/0.1")
      .json(update)
      .send()
      .await
      .map_err(|e| AppError::SaveFailed(e.to_string()))?;

    let status = res.status();
    let out: SaveOut = res
      .json()
      .await
      .map_err(|e| AppError::SaveFailed(format!("HTTP {}: {}", status, e)))?;
    if out.success {
      debug!(target: "puzzle", "Progress saved remotely");
      Ok(())
    } else {
      Err(AppError::SaveFailed(format!("backend refused progress (HTTP {})", status)))
    }
  }

  #[instrument(level = "debug", skip(self))]
  async fn load_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, AppError> {
    self.get_json(&["user-progress", user_id]).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{FallbackCatalog, StaticCatalog};
  use crate::domain::CatalogOrigin;
  use crate::seeds::{builtin_tools, builtin_use_cases};
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api/", server.uri())).unwrap()
  }

  #[test]
  fn rejects_unusable_base_urls() {
    assert!(matches!(ApiClient::new("not a url"), Err(AppError::Config(_))));
    assert!(matches!(ApiClient::new("mailto:someone@example.com"), Err(AppError::Config(_))));
  }

  #[tokio::test]
  async fn ids_are_percent_encoded_into_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/use-cases/a%2Fb%3Fc"))
      .respond_with(ResponseTemplate::new(200).set_body_json(&builtin_use_cases()[0]))
      .mount(&server)
      .await;

    let uc = client_for(&server).get_use_case("a/b?c").await.unwrap();
    assert_eq!(uc.unwrap().id, builtin_use_cases()[0].id);
  }

  #[tokio::test]
  async fn loads_progress_for_a_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/user-progress/u%201"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
        "userId": "u 1",
        "useCaseId": "chatbot",
        "title": "Customer Service Chatbot",
        "score": 70,
        "hintsUsed": 4,
        "completed": true,
        "lastPlayed": "2024-05-01T12:00:00Z"
      }])))
      .mount(&server)
      .await;

    let records = client_for(&server).load_progress("u 1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].score, 70);
    assert_eq!(records[0].hints_used, 4);
    assert!(records[0].completed);
    assert_eq!(records[0].last_played.to_rfc3339(), "2024-05-01T12:00:00+00:00");
  }

  #[tokio::test]
  async fn lists_tools_and_use_cases() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/tools"))
      .respond_with(ResponseTemplate::new(200).set_body_json(builtin_tools()))
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/api/use-cases"))
      .respond_with(ResponseTemplate::new(200).set_body_json(builtin_use_cases()))
      .mount(&server)
      .await;

    let api = client_for(&server);
    assert_eq!(api.list_tools().await.unwrap(), builtin_tools());
    assert_eq!(api.list_use_cases().await.unwrap().len(), builtin_use_cases().len());
  }

  #[tokio::test]
  async fn missing_use_case_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/use-cases/nope"))
      .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "Use case not found"})))
      .mount(&server)
      .await;

    assert!(client_for(&server).get_use_case("nope").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn server_error_is_catalog_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/tools"))
      .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
      .mount(&server)
      .await;

    let err = client_for(&server).list_tools().await.unwrap_err();
    assert!(matches!(err, AppError::CatalogUnavailable(_)));
  }

  #[tokio::test]
  async fn save_progress_posts_camel_case_and_reads_success() {
    let server = MockServer::start().await;
    let update = ProgressUpdate {
      user_id: "u1".into(),
      use_case_id: "chatbot".into(),
      score: 30,
      hints_used: 1,
      completed: true,
    };
    Mock::given(method("POST"))
      .and(path("/api/user-progress"))
      .and(body_json(serde_json::json!({
        "userId": "u1", "useCaseId": "chatbot", "score": 30, "hintsUsed": 1, "completed": true
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
      .mount(&server)
      .await;

    client_for(&server).save_progress(&update).await.unwrap();
  }

  #[tokio::test]
  async fn refused_save_is_save_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/user-progress"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})))
      .mount(&server)
      .await;

    let update = ProgressUpdate {
      user_id: "u1".into(),
      use_case_id: "x".into(),
      score: 0,
      hints_used: 0,
      completed: false,
    };
    let err = client_for(&server).save_progress(&update).await.unwrap_err();
    assert!(matches!(err, AppError::SaveFailed(_)));
  }

  #[tokio::test]
  async fn probe_reports_backend_database_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/test-connection"))
      .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
        "error": "Failed to connect to database",
        "details": "disk I/O error",
        "category": "database"
      })))
      .mount(&server)
      .await;

    let err = client_for(&server).test_connection().await.unwrap_err();
    assert!(err.to_string().contains("disk I/O error"));
  }

  #[tokio::test]
  async fn unreachable_backend_falls_back_to_builtin_catalog() {
    let server = MockServer::start().await;
    let api = client_for(&server);
    drop(server);

    let catalog = FallbackCatalog::new(Some(api), StaticCatalog::builtin());
    let (ucs, origin) = catalog.list_use_cases().await;
    assert_eq!(origin, CatalogOrigin::Fallback);
    assert_eq!(ucs.len(), builtin_use_cases().len());
  }
}
