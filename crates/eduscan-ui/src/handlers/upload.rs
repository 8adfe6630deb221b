//! Upload page, intake API and live progress stream

use crate::handlers::{Layout, render};
use crate::{AppState, UiError};
use askama::Template;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{
        Html,
        sse::{Event, KeepAlive, Sse},
    },
};
use eduscan_core::Notice;
use eduscan_session::Session;
use eduscan_upload::{FileRef, Rejection, RejectionReason, UploadItem, UploadStatus};
use futures::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

#[derive(Template)]
#[template(path = "upload.html")]
struct UploadTemplate {
    layout: Layout,
    max_file_mib: u64,
    accept: String,
}

pub async fn upload_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>, UiError> {
    let intake = &state.uploads.config().intake;
    let mut accept: Vec<String> = intake.allowed_extensions.clone();
    accept.extend(intake.allowed_mime_types.iter().cloned());

    render(&UploadTemplate {
        layout: Layout::new("upload", &session),
        max_file_mib: intake.max_file_size_bytes / (1024 * 1024),
        accept: accept.join(","),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadListResponse {
    pub items: Vec<UploadItem>,
    /// At least one item is ready for grading
    pub can_proceed: bool,
}

pub async fn list_uploads(State(state): State<AppState>) -> Json<UploadListResponse> {
    let items = state.uploads.list().await;
    let can_proceed = items
        .iter()
        .any(|item| item.status == UploadStatus::Completed);
    Json(UploadListResponse { items, can_proceed })
}

pub async fn get_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UploadItem>, UiError> {
    state
        .uploads
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| UiError::NotFound(format!("upload not found: {}", id)))
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub accepted: Vec<UploadItem>,
    pub rejected: Vec<Rejection>,
    pub notices: Vec<Notice>,
}

/// Multipart intake. Only sizes, names and declared types are kept.
pub async fn accept_uploads(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AcceptResponse>, UiError> {
    let mut files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| UiError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);

        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| UiError::BadRequest(e.to_string()))?
        {
            size_bytes += chunk.len() as u64;
        }

        debug!("Received {} ({} bytes)", name, size_bytes);
        files.push(FileRef::new(name, size_bytes, content_type));
    }

    if files.is_empty() {
        return Err(UiError::BadRequest("no files in request".to_string()));
    }

    let outcome = state.uploads.accept(files).await;

    let mut notices = Vec::new();
    for _ in &outcome.accepted {
        state.metrics.record_upload_accepted();
    }
    if !outcome.accepted.is_empty() {
        notices.push(Notice::new(
            "Files Added",
            format!("{} file(s) added for processing.", outcome.accepted.len()),
        ));
    }
    for rejection in &outcome.rejected {
        let (label, description) = match &rejection.reason {
            RejectionReason::UnsupportedType => (
                "unsupported_type",
                format!("{} is not a supported file type.", rejection.file_name),
            ),
            RejectionReason::TooLarge { max_bytes, .. } => (
                "too_large",
                format!(
                    "{} exceeds the {}MB limit.",
                    rejection.file_name,
                    max_bytes / (1024 * 1024)
                ),
            ),
        };
        state.metrics.record_upload_rejected(label);
        notices.push(Notice::destructive("File Rejected", description));
    }

    Ok(Json(AcceptResponse {
        accepted: outcome.accepted,
        rejected: outcome.rejected,
        notices,
    }))
}

pub async fn remove_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, UiError> {
    if state.uploads.remove(&id).await {
        state.metrics.record_upload_removed();
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(UiError::NotFound(format!("upload not found: {}", id)))
    }
}

/// SSE stream of upload events
pub async fn upload_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.uploads.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        result.ok().and_then(|event| {
            serde_json::to_string(&event)
                .ok()
                .map(|data| Ok(Event::default().event("upload").data(data)))
        })
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

#[cfg(test)]
mod tests {
    use crate::build_router;
    use crate::test_support::signed_in_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "eduscan-test-boundary";

    fn multipart(files: &[(&str, &str, usize)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, content_type, size) in files {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                    name
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
            body.extend(std::iter::repeat_n(b'x', *size));
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/uploads")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_upload_page_renders() {
        let dir = TempDir::new().unwrap();
        let app = build_router(signed_in_state(&dir).await);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Upload Answer Sheets"));
        assert!(html.contains("Dr. Sarah Wilson"));
    }

    #[tokio::test]
    async fn test_accept_and_reject() {
        let dir = TempDir::new().unwrap();
        let state = signed_in_state(&dir).await;
        let app = build_router(state.clone());

        let response = app
            .oneshot(multipart(&[
                ("quiz.pdf", "application/pdf", 128),
                ("notes.docx", "application/msword", 64),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let value = json(response).await;
        assert_eq!(value["accepted"].as_array().unwrap().len(), 1);
        assert_eq!(value["accepted"][0]["file"]["sizeBytes"], 128);
        assert_eq!(value["rejected"][0]["fileName"], "notes.docx");
        assert_eq!(value["rejected"][0]["reason"]["kind"], "unsupported_type");
        assert_eq!(value["notices"][0]["title"], "Files Added");
        assert_eq!(value["notices"][1]["title"], "File Rejected");

        assert_eq!(state.uploads.len().await, 1);
        assert_eq!(state.metrics.uploads_accepted_total.get(), 1.0);
    }

    #[tokio::test]
    async fn test_empty_multipart_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let app = build_router(signed_in_state(&dir).await);

        let response = app.oneshot(multipart(&[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_and_remove() {
        let dir = TempDir::new().unwrap();
        let state = signed_in_state(&dir).await;
        let app = build_router(state.clone());

        let value = json(
            app.clone()
                .oneshot(multipart(&[("a.png", "image/png", 10)]))
                .await
                .unwrap(),
        )
        .await;
        let id = value["accepted"][0]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/uploads/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/uploads/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // A late pipeline step must not bring the item back
        tokio::time::sleep(Duration::from_millis(50)).await;
        let list = json(
            app.oneshot(Request::builder().uri("/api/uploads").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert!(list["items"].as_array().unwrap().is_empty());
        assert_eq!(list["canProceed"], false);
    }

    #[tokio::test]
    async fn test_completed_upload_enables_proceed() {
        let dir = TempDir::new().unwrap();
        let state = signed_in_state(&dir).await;
        let app = build_router(state.clone());

        app.clone()
            .oneshot(multipart(&[("a.pdf", "application/pdf", 10)]))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while !state.uploads.has_completed().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        let list = json(
            app.oneshot(Request::builder().uri("/api/uploads").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(list["canProceed"], true);
        assert_eq!(list["items"][0]["status"], "completed");
        assert!(
            list["items"][0]["resultText"]
                .as_str()
                .unwrap()
                .contains("a.pdf")
        );
    }
}
