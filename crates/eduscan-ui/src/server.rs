//! Web UI server implementation

use crate::handlers;
use crate::middleware::{require_session_api, require_session_page};
use crate::readiness::SessionReadiness;
use crate::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use eduscan_observability::{HealthState, health_router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// UI server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Auto-refresh interval for the dashboard summary in seconds (default: 5)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Largest accepted request body, mainly multipart uploads (default: 64 MiB)
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,

    /// Show the demo account on the login page (default: true)
    #[serde(default = "default_show_demo_credentials")]
    pub show_demo_credentials: bool,
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_max_request_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_show_demo_credentials() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            max_request_bytes: default_max_request_bytes(),
            show_demo_credentials: default_show_demo_credentials(),
        }
    }
}

/// Build the Axum router with all routes, including health endpoints
pub fn build_router(state: AppState) -> Router {
    // HTML pages behind the session gate
    let pages = Router::new()
        .route("/", get(handlers::upload::upload_page))
        .route("/dashboard", get(handlers::dashboard::dashboard_page))
        .route("/analytics", get(handlers::analytics::analytics_page))
        .route("/feedback", get(handlers::feedback::feedback_page))
        .route("/about", get(handlers::about::about_page))
        .route_layer(from_fn_with_state(state.clone(), require_session_page));

    // JSON API behind the session gate
    let api = Router::new()
        .route("/api/session", get(handlers::auth::current_session))
        .route("/api/session/logout", post(handlers::auth::api_logout))
        .route(
            "/api/uploads",
            get(handlers::upload::list_uploads).post(handlers::upload::accept_uploads),
        )
        .route("/api/uploads/events", get(handlers::upload::upload_events))
        .route(
            "/api/uploads/{id}",
            get(handlers::upload::get_upload).delete(handlers::upload::remove_upload),
        )
        .route("/api/grading", get(handlers::dashboard::grading_board))
        .route("/api/grading/{id}/edit", post(handlers::dashboard::toggle_edit))
        .route("/api/grading/{id}/score", put(handlers::dashboard::update_score))
        .route("/api/grading/{id}/feedback", put(handlers::dashboard::update_feedback))
        .route("/api/grading/{id}/save", post(handlers::dashboard::save_answer))
        .route("/api/grading/{id}/reset", post(handlers::dashboard::reset_answer))
        .route("/api/feedback", get(handlers::feedback::list_feedback))
        .route(
            "/api/feedback/{id}/generate",
            post(handlers::feedback::generate_ai_feedback),
        )
        .route(
            "/api/feedback/{id}/custom",
            put(handlers::feedback::update_custom_feedback),
        )
        .route("/api/feedback/{id}/send", post(handlers::feedback::send_feedback))
        .route("/api/analytics", get(handlers::analytics::analytics_report))
        .route_layer(from_fn_with_state(state.clone(), require_session_api));

    let health = HealthState::with_readiness_checker(
        state.metrics.clone(),
        Arc::new(SessionReadiness::new(state.gate.clone())),
    );

    Router::new()
        // Public pages and login endpoints
        .route(
            "/login",
            get(handlers::auth::login_page).post(handlers::auth::login_submit),
        )
        .route("/logout", post(handlers::auth::logout_submit))
        .route("/api/session/login", post(handlers::auth::api_login))
        // Static assets (embedded in binary)
        .route("/static/css/style.css", get(handlers::static_files::serve_css))
        .route("/static/js/app.js", get(handlers::static_files::serve_app_js))
        .route("/static/js/charts.js", get(handlers::static_files::serve_charts_js))
        .merge(pages)
        .merge(api)
        .fallback(handlers::not_found::not_found)
        .layer(DefaultBodyLimit::max(state.config.max_request_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(health_router(health))
}

/// UI Server
pub struct UiServer {
    addr: SocketAddr,
    state: AppState,
}

impl UiServer {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self { addr, state }
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let addr = listener.local_addr()?;

        info!("EduScan AI server starting on http://{}", addr);
        info!("   Login:      http://{}/login", addr);
        info!("   Upload:     http://{}/", addr);
        info!("   Dashboard:  http://{}/dashboard", addr);
        info!("   Health:     http://{}/healthz", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
