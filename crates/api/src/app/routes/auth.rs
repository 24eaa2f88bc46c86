//! Sign-in flow: email a magic link, verify it, establish a session cookie.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use serde_json::Value;

use billfold_auth::{JwtClaims, JwtSigner, MagicToken, is_valid_email};
use billfold_core::Locale;
use billfold_mailer::magic_link_email;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::CurrentUser;
use crate::middleware::AUTH_COOKIE;

fn request_locale(headers: &HeaderMap) -> Locale {
    headers
        .get("x-locale")
        .and_then(|v| v.to_str().ok())
        .map(Locale::parse_or_default)
        .unwrap_or_default()
}

pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let Some(email) = body.get("email").and_then(Value::as_str).filter(|e| is_valid_email(e))
    else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_email", "invalid email address");
    };

    // Opportunistic sweep; stale tokens have no other expiry mechanism here.
    if let Err(e) = services.tokens.purge_expired().await {
        tracing::warn!("failed to purge expired tokens: {e}");
    }

    let locale = request_locale(&headers);
    let token = MagicToken::issue(email, Utc::now());
    let url = format!(
        "{}/{}/verify?token={}",
        services.config.app_url, locale, token.token
    );
    let recipient = token.email.clone();

    if let Err(e) = services.tokens.insert(token).await {
        return errors::store_error_to_response(e);
    }

    if let Err(e) = services.mailer.send(magic_link_email(&recipient, &url, locale)).await {
        return errors::mail_error_to_response(e);
    }

    (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response()
}

pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let Some(token) = body.get("token").and_then(Value::as_str).filter(|t| !t.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_token", "token is required");
    };

    let record = match services.tokens.consume(token).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_token",
                "invalid or expired token",
            );
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let user = match services.users.find_or_create_by_email(&record.email).await {
        Ok(user) => user,
        Err(e) => return errors::store_error_to_response(e),
    };

    let ttl = Duration::days(services.config.session_ttl_days);
    let claims = JwtClaims::session(user.id, &user.email, user.role.clone(), Utc::now(), ttl);
    let session = match services.jwt.sign(&claims) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("failed to sign session token: {e}");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "session_error",
                "failed to establish session",
            );
        }
    };

    let cookie = session_cookie(&session, ttl.num_seconds(), services.config.cookie_secure);
    let Ok(cookie) = HeaderValue::from_str(&cookie) else {
        return errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "session_error",
            "failed to establish session",
        );
    };

    let mut response = (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true, "user": dto::user_to_json(&user) })),
    )
        .into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    response
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    match services.users.get(current.user_id()).await {
        Ok(Some(user)) => {
            (StatusCode::OK, Json(serde_json::json!({ "user": dto::user_to_json(&user) })))
                .into_response()
        }
        Ok(None) => errors::json_error(StatusCode::UNAUTHORIZED, "unknown_user", "account not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn signout(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let cookie = clear_cookie(services.config.cookie_secure);
    let Ok(cookie) = HeaderValue::from_str(&cookie) else {
        return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", "failed to sign out");
    };

    let mut response =
        (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    response
}

fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{AUTH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_carries_the_hardening_attributes() {
        let cookie = session_cookie("tok", 604800, true);
        assert!(cookie.starts_with("auth_token=tok;"));
        for attr in ["HttpOnly", "SameSite=Lax", "Max-Age=604800", "Secure"] {
            assert!(cookie.contains(attr), "missing {attr}");
        }
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_cookie(false);
        assert!(cookie.starts_with("auth_token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }
}
