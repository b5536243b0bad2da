//! Session endpoints: signup, login, refresh, logout.
//!
//! The access token travels in the response body; the refresh token
//! only ever travels as an HTTP-only cookie scoped to `/auth`, so
//! scripts never see it.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use taskhub_core::ServiceError;

use crate::api::AppState;
use crate::model::{LoginRequest, SignupRequest, TokenPair, User, UserProfile};

/// Cookie carrying the refresh token.
const REFRESH_COOKIE: &str = "refresh_token";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

async fn signup(
    State(svc): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> Result<Response, ServiceError> {
    let user = svc.signup(input)?;
    let pair = svc.issue_tokens(&user, svc.config().access_ttl)?;
    Ok(session_response(StatusCode::CREATED, &user, &pair))
}

async fn login(
    State(svc): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Response, ServiceError> {
    let user = svc.login(&input.email, &input.password)?;
    let pair = svc.issue_tokens(&user, svc.config().access_ttl)?;
    Ok(session_response(StatusCode::OK, &user, &pair))
}

/// Rotate the refresh session. The new access token carries the short
/// refresh-path TTL; the cookie is replaced with the rotated token.
async fn refresh(State(svc): State<AppState>, headers: HeaderMap) -> Result<Response, ServiceError> {
    let token = read_refresh_cookie(&headers)
        .ok_or_else(|| ServiceError::Unauthorized("missing refresh token".into()))?;

    let (user, pair) = svc.refresh(&token)?;
    Ok(session_response(StatusCode::OK, &user, &pair))
}

/// Revoke the current session and clear the cookie. Succeeds even with
/// no cookie or a dead token — logout is idempotent.
async fn logout(State(svc): State<AppState>, headers: HeaderMap) -> Result<Response, ServiceError> {
    if let Some(token) = read_refresh_cookie(&headers) {
        svc.revoke(&token)?;
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_refresh_cookie())],
        Json(serde_json::json!({ "revoked": true })),
    )
        .into_response())
}

/// Body + Set-Cookie for any endpoint that establishes a session.
fn session_response(status: StatusCode, user: &User, pair: &TokenPair) -> Response {
    let body = serde_json::json!({
        "user": UserProfile::from(user),
        "access_token": pair.access_token,
        "token_type": "Bearer",
        "expires_in": pair.expires_in,
    });

    (
        status,
        [(header::SET_COOKIE, refresh_cookie(&pair.refresh_token, pair.refresh_max_age))],
        Json(body),
    )
        .into_response()
}

fn refresh_cookie(token: &str, max_age: i64) -> String {
    format!("{REFRESH_COOKIE}={token}; Max-Age={max_age}; Path=/auth; HttpOnly; SameSite=Lax; Secure")
}

fn clear_refresh_cookie() -> String {
    format!("{REFRESH_COOKIE}=; Max-Age=0; Path=/auth; HttpOnly; SameSite=Lax; Secure")
}

/// Pull the refresh token out of the Cookie header(s).
fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{REFRESH_COOKIE}=");
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some(token) = pair.trim().strip_prefix(&prefix) {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_attributes() {
        let cookie = refresh_cookie("tok123", 604800);
        assert!(cookie.starts_with("refresh_token=tok123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("Path=/auth"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_refresh_cookie();
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("refresh_token=;"));
    }

    #[test]
    fn read_cookie_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; refresh_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(read_refresh_cookie(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn read_cookie_missing_or_empty() {
        let headers = HeaderMap::new();
        assert!(read_refresh_cookie(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("refresh_token="));
        assert!(read_refresh_cookie(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(read_refresh_cookie(&headers).is_none());
    }
}
