//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/...`
/// - Static SPA from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/health", get(http::http_health))
        .route("/api/test-connection", get(http::http_test_connection))
        .route("/api/tools", get(http::http_list_tools))
        .route("/api/use-cases", get(http::http_list_use_cases))
        .route("/api/use-cases/:id", get(http::http_get_use_case))
        .route("/api/use-cases/:id/board", get(http::http_get_board))
        .route("/api/grade", post(http::http_post_grade))
        .route("/api/hint", post(http::http_post_hint))
        .route("/api/user-progress", post(http::http_post_progress))
        .route("/api/user-progress/:user_id", get(http::http_get_progress))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::{FallbackCatalog, StaticCatalog};
    use crate::seeds::{builtin_tools, builtin_use_cases};
    use crate::store::Store;

    async fn app() -> Router {
        let store = Store::open_in_memory().unwrap();
        store.replace_catalog(&builtin_tools(), &builtin_use_cases()).await.unwrap();
        let state = AppState::with_catalog(FallbackCatalog::new(Some(store), StaticCatalog::builtin()));
        build_router(Arc::new(state), Path::new("./static"))
    }

    fn fallback_only_app() -> Router {
        let state = AppState::with_catalog(FallbackCatalog::new(None, StaticCatalog::builtin()));
        build_router(Arc::new(state), Path::new("./static"))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let source = res
            .headers()
            .get(http::CATALOG_SOURCE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, source, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_probe() {
        let (status, _, body) = send(app().await, get_req("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, _, body) = send(app().await, get_req("/api/test-connection")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], true);

        let (status, _, body) = send(fallback_only_app(), get_req("/api/test-connection")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["category"], "network");
    }

    #[tokio::test]
    async fn catalog_endpoints_report_their_source() {
        let (status, source, body) = send(app().await, get_req("/api/use-cases")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.as_deref(), Some("store"));
        assert_eq!(body[0]["id"], "text-summarization");

        let (_, source, body) = send(fallback_only_app(), get_req("/api/tools?category=model")).await;
        assert_eq!(source.as_deref(), Some("fallback"));
        assert_eq!(body.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn unknown_category_is_bad_request() {
        let (status, _, _) = send(app().await, get_req("/api/tools?category=gadget")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn use_case_lookup() {
        let (status, _, body) = send(app().await, get_req("/api/use-cases/chatbot")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requiredTools"], json!(["openai-gpt4", "langchain"]));

        let (status, _, body) = send(app().await, get_req("/api/use-cases/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Use case not found");
    }

    #[tokio::test]
    async fn seeded_board_is_reproducible() {
        let (_, _, a) = send(app().await, get_req("/api/use-cases/chatbot/board?seed=9")).await;
        let (_, _, b) = send(app().await, get_req("/api/use-cases/chatbot/board?seed=9")).await;
        assert_eq!(a, b);
        assert_eq!(a.as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn grading_over_http() {
        let req = post_json(
            "/api/grade",
            json!({"useCaseId": "text-summarization", "selection": ["openai-gpt4", "langchain", "nltk"]}),
        );
        let (status, _, body) = send(app().await, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"], "PERFECT");
        assert_eq!(body["score"], 30);

        let req = post_json("/api/grade", json!({"useCaseId": "text-summarization", "selection": ["nltk"]}));
        let (_, _, body) = send(app().await, req).await;
        assert_eq!(body["verdict"], "MISSING_REQUIRED");
        assert_eq!(body["score"], Value::Null);
        assert_eq!(body["missingRequired"], json!(["openai-gpt4"]));

        let req = post_json("/api/grade", json!({"useCaseId": "ghost", "selection": []}));
        let (status, _, _) = send(app().await, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn hints_over_http() {
        let req = post_json("/api/hint", json!({"useCaseId": "chatbot", "hintsUsed": 0}));
        let (_, _, body) = send(app().await, req).await;
        assert_eq!(body["hintsUsed"], 1);
        assert_eq!(body["exhausted"], false);
        assert!(body["hint"].as_str().unwrap().contains("language model"));

        let req = post_json("/api/hint", json!({"useCaseId": "chatbot", "hintsUsed": 3}));
        let (_, _, body) = send(app().await, req).await;
        assert_eq!(body["hintsUsed"], 3);
        assert_eq!(body["exhausted"], true);
        assert_eq!(body["hint"], Value::Null);
    }

    #[tokio::test]
    async fn progress_round_trip_keeps_best_score() {
        let app = app().await;
        let save = |score: u32, hints: u32, completed: bool| {
            post_json(
                "/api/user-progress",
                json!({"userId": "u1", "useCaseId": "chatbot", "score": score, "hintsUsed": hints, "completed": completed}),
            )
        };

        let (_, _, body) = send(app.clone(), save(70, 2, false)).await;
        assert_eq!(body["success"], true);
        let (_, _, body) = send(app.clone(), save(50, 4, true)).await;
        assert_eq!(body["success"], true);

        let (status, _, body) = send(app.clone(), get_req("/api/user-progress/u1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["score"], 70);
        assert_eq!(body[0]["hintsUsed"], 4);
        assert_eq!(body[0]["completed"], true);

        let bad = post_json(
            "/api/user-progress",
            json!({"userId": "u1", "useCaseId": "ghost", "score": 1, "hintsUsed": 0, "completed": false}),
        );
        let (_, _, body) = send(app, bad).await;
        assert_eq!(body["success"], false);
    }
}
