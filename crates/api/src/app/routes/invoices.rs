//! Invoice collection CRUD.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::Value;

use billfold_core::InvoiceId;
use billfold_invoices::{Invoice, process_invoice};
use billfold_store::duplicate_document;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_invoice).get(list_invoices))
        .route("/:id", get(get_invoice).put(update_invoice).delete(delete_invoice))
        .route("/:id/duplicate", post(duplicate_invoice))
}

fn parse_id(raw: &str) -> Result<InvoiceId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id")
    })
}

/// Validate + normalize a request body into a canonical document.
fn document_from_body(body: Value) -> Result<Invoice, axum::response::Response> {
    match Invoice::from_value(body) {
        Ok(invoice) => Ok(process_invoice(invoice)),
        Err(e) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_invoice",
            e.to_string(),
        )),
    }
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let doc = match document_from_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };

    match services.invoices.create(current.user_id(), doc).await {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<dto::ListParams>,
) -> axum::response::Response {
    match services.invoices.list(current.user_id(), params.into()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.invoices.get(current.user_id(), id).await {
        Ok(Some(stored)) => (StatusCode::OK, Json(stored)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let doc = match document_from_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };

    match services.invoices.update(current.user_id(), id, doc).await {
        Ok(Some(stored)) => (StatusCode::OK, Json(stored)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.invoices.delete(current.user_id(), id).await {
        Ok(true) => (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn duplicate_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let source = match services.invoices.get(current.user_id(), id).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    match services
        .invoices
        .create(current.user_id(), duplicate_document(&source))
        .await
    {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
