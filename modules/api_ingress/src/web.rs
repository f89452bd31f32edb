use axum::{
    extract::{Extension, OriginalUri},
    response::{Html, IntoResponse, Json},
};
use modkit::{Problem, ProblemResponse};
use serde_json::{json, Value};
use std::sync::Arc;

use axum::http::StatusCode;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to Church App API" }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Catch-all for unrouted paths so clients always get a problem body.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ProblemResponse {
    Problem::new(
        StatusCode::NOT_FOUND,
        "Not Found",
        format!("No route for {}", uri.path()),
    )
    .with_code("ROUTE_NOT_FOUND")
    .with_instance(uri.path())
    .into()
}

pub async fn openapi_json(
    Extension(doc): Extension<Arc<utoipa::openapi::OpenApi>>,
) -> impl IntoResponse {
    Json(doc.as_ref().clone())
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Church App API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
