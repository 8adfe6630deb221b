//! Login, logout and session endpoints

use crate::handlers::render;
use crate::{AppState, UiError};
use askama::Template;
use axum::{
    Extension, Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use eduscan_core::Notice;
use eduscan_session::Session;
use serde::{Deserialize, Serialize};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    email: String,
    error: Option<String>,
    demo_email: Option<String>,
    demo_password: Option<String>,
}

impl LoginTemplate {
    fn new(state: &AppState, email: String, error: Option<String>) -> Self {
        let auth = state.gate.config();
        let show = state.config.show_demo_credentials;
        Self {
            email,
            error,
            demo_email: show.then(|| auth.email.clone()),
            demo_password: show.then(|| auth.password.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: Session,
    pub notice: Notice,
}

pub async fn login_page(State(state): State<AppState>) -> Response {
    if state.gate.is_authenticated().await {
        return Redirect::to("/").into_response();
    }

    match render(&LoginTemplate::new(&state, String::new(), None)) {
        Ok(html) => html.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Form login: redirect home on success, re-render with an error otherwise
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let success = state.gate.login(&form.email, &form.password).await;
    state.metrics.record_login(success);

    if success {
        return Redirect::to("/").into_response();
    }

    let template = LoginTemplate::new(
        &state,
        form.email,
        Some("Invalid credentials. Please try again.".to_string()),
    );
    match render(&template) {
        Ok(html) => (StatusCode::UNAUTHORIZED, html).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn logout_submit(State(state): State<AppState>) -> Redirect {
    state.gate.logout().await;
    state.metrics.record_logout();
    Redirect::to("/login")
}

/// JSON login for scripted clients
pub async fn api_login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<LoginResponse>, Response> {
    let success = state.gate.login(&form.email, &form.password).await;
    state.metrics.record_login(success);

    match state.gate.current().await {
        Some(user) if success => Ok(Json(LoginResponse {
            user,
            notice: Notice::new(
                "Welcome to EduScan AI",
                "Login successful! Redirecting to your dashboard.",
            ),
        })),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(Notice::destructive(
                "Login Failed",
                "Invalid credentials. Please try again.",
            )),
        )
            .into_response()),
    }
}

pub async fn api_logout(State(state): State<AppState>) -> StatusCode {
    state.gate.logout().await;
    state.metrics.record_logout();
    StatusCode::NO_CONTENT
}

pub async fn current_session(
    Extension(session): Extension<Session>,
) -> Result<Json<Session>, UiError> {
    Ok(Json(session))
}
