use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use billfold_auth::JwtValidator;

use crate::context::CurrentUser;

/// Name of the session cookie set on verify and cleared on signout.
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the session token (bearer header or cookie), validate it, and
/// stash the authenticated identity in request extensions.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = session_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = state
        .jwt
        .validate(&token, Utc::now())
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(CurrentUser::new(
        claims.sub,
        claims.email.clone(),
        claims.role.clone(),
    ));

    Ok(next.run(req).await)
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers)
        .map(str::to_string)
        .or_else(|| cookie_value(headers, AUTH_COOKIE))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(header::COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name && !value.is_empty() {
                    return Some(value.to_string());
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

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_header_wins() {
        let mut headers = headers_with(header::AUTHORIZATION, "Bearer abc");
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token=def"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_used_without_a_bearer() {
        let headers = headers_with(header::COOKIE, "theme=dark; auth_token=xyz; lang=en");
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_and_empty_tokens_are_absent() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        let headers = headers_with(header::AUTHORIZATION, "Bearer   ");
        assert_eq!(session_token(&headers), None);
        let headers = headers_with(header::COOKIE, "auth_token=");
        assert_eq!(session_token(&headers), None);
    }
}
