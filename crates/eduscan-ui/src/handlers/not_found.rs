//! Fallback for unknown paths

use crate::handlers::render;
use askama::Template;
use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    path: String,
}

/// 404 page, or a JSON error for API paths
pub async fn not_found(uri: Uri) -> Response {
    let path = uri.path().to_string();
    warn!("404 Error: User attempted to access non-existent route: {}", path);

    if path.starts_with("/api/") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no route for {}", path) })),
        )
            .into_response();
    }

    match render(&NotFoundTemplate { path }) {
        Ok(html) => (StatusCode::NOT_FOUND, html).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::build_router;
    use crate::test_support::test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_page_is_404() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir).await);

        let response = app
            .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Page Not Found"));
        assert!(html.contains("nowhere"));
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir).await);

        let response = app
            .oneshot(Request::builder().uri("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value["error"].as_str().unwrap().contains("/api/nothing"));
    }
}
