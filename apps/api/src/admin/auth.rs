//! HTTP Basic authentication for the admin API.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// True when `header` carries `Basic base64(username:password)` matching the
/// configured credentials.
pub fn check_basic_auth(header: Option<&str>, username: &str, password: &str) -> bool {
    let Some(encoded) = header.and_then(|h| h.strip_prefix("Basic ")) else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(credentials) = String::from_utf8(decoded) else {
        return false;
    };
    match credentials.split_once(':') {
        Some((user, pass)) => user == username && pass == password,
        None => false,
    }
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !check_basic_auth(
        header,
        &state.config.admin_username,
        &state.config.admin_password,
    ) {
        warn!("Rejected admin request to {}", req.uri().path());
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(req).await)
}
