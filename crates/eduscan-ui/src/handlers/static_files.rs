//! Static file handlers - embedded in binary

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

fn asset(content_type: &'static str, body: &'static str) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

pub async fn serve_css() -> Response {
    asset(
        "text/css; charset=utf-8",
        include_str!("../static/css/style.css"),
    )
}

pub async fn serve_app_js() -> Response {
    asset(
        "application/javascript; charset=utf-8",
        include_str!("../static/js/app.js"),
    )
}

pub async fn serve_charts_js() -> Response {
    asset(
        "application/javascript; charset=utf-8",
        include_str!("../static/js/charts.js"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_upload_list_offers_ocr_preview() {
        let script = body(serve_app_js().await).await;
        assert!(script.contains("item.status === 'completed' && item.resultText"));
        assert!(script.contains("title: 'OCR Results', description: item.resultText"));
        // Progress stays visible through processing
        assert!(script.contains("if (item.status !== 'completed')"));
        assert!(!script.contains("innerHTML"));
    }
}
