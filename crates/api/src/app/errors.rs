use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use billfold_export::ExportError;
use billfold_mailer::MailError;
use billfold_parser::ParseError;
use billfold_places::PlacesError;
use billfold_store::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Backend(msg) => {
            tracing::error!("store backend error: {msg}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

pub fn mail_error_to_response(err: MailError) -> axum::response::Response {
    tracing::error!("mail delivery failed: {err}");
    json_error(StatusCode::BAD_GATEWAY, "mail_failed", "failed to send email")
}

pub fn parse_error_to_response(err: ParseError) -> axum::response::Response {
    match err {
        ParseError::EmptyInput | ParseError::TooLarge { .. } => {
            json_error(StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        ParseError::UnsupportedType(_) => {
            json_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_file_type", err.to_string())
        }
        ParseError::Transport(_) | ParseError::Service { .. } | ParseError::Malformed(_) => {
            tracing::error!("invoice parse failed: {err}");
            json_error(StatusCode::BAD_GATEWAY, "parse_failed", "failed to parse invoice")
        }
    }
}

pub fn places_error_to_response(err: PlacesError) -> axum::response::Response {
    match err {
        PlacesError::InvalidInput => {
            json_error(StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        PlacesError::Transport(_) | PlacesError::Service(_) => {
            tracing::error!("places lookup failed: {err}");
            json_error(StatusCode::BAD_GATEWAY, "places_failed", "address lookup failed")
        }
    }
}

pub fn export_error_to_response(err: ExportError) -> axum::response::Response {
    match err {
        ExportError::Unsupported(format) => json_error(
            StatusCode::NOT_IMPLEMENTED,
            "unsupported_export",
            format!("{format} export is not implemented"),
        ),
        ExportError::Encode(msg) => {
            tracing::error!("export encoding failed: {msg}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_failed", "failed to encode export")
        }
    }
}
