//! Session gate middleware for protected pages and API routes

use crate::{AppState, UiError, handlers::render};
use askama::Template;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use eduscan_session::AuthState;
use tracing::debug;

#[derive(Template)]
#[template(path = "loading.html")]
struct LoadingTemplate;

/// Protected pages: signed out redirects to `/login`, restoring renders a
/// placeholder that reloads itself.
pub async fn require_session_page(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.gate.state().await {
        AuthState::Authenticated(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        AuthState::Unknown => match render(&LoadingTemplate) {
            Ok(html) => html.into_response(),
            Err(e) => e.into_response(),
        },
        AuthState::Unauthenticated => {
            debug!("Redirecting {} to login", request.uri().path());
            Redirect::to("/login").into_response()
        }
    }
}

/// Protected JSON endpoints: 401 when signed out, 503 while restoring
pub async fn require_session_api(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.gate.state().await {
        AuthState::Authenticated(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        AuthState::Unknown => UiError::Restoring.into_response(),
        AuthState::Unauthenticated => UiError::Unauthorized.into_response(),
    }
}
