//! Invoice actions: render, export, parse, and email.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Multipart, Query},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::Value;

use billfold_auth::is_valid_email;
use billfold_core::InvoiceId;
use billfold_export::{ExportFormat, export_invoice};
use billfold_invoices::{Invoice, process_invoice};
use billfold_mailer::{Attachment, default_invoice_subject, invoice_email};
use billfold_templates::{TemplateError, render_selected};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

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

fn render_document(invoice: &Invoice) -> Result<String, axum::response::Response> {
    render_selected(invoice).map_err(|e| match e {
        TemplateError::UnknownTemplate(_) => {
            errors::json_error(StatusCode::NOT_FOUND, "template_not_found", e.to_string())
        }
    })
}

/// Render the selected template to a printable standalone HTML document.
pub async fn generate(
    Extension(_current): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let doc = match document_from_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };

    let html = match render_document(&doc) {
        Ok(html) => html,
        Err(resp) => return resp,
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, "attachment; filename=invoice.html".to_string()),
        ],
        html,
    )
        .into_response()
}

/// Export the document in the requested format.
pub async fn export(
    Extension(_current): Extension<CurrentUser>,
    Query(params): Query<dto::ExportParams>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let Some(format) = params.format.as_deref().and_then(ExportFormat::parse) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "unsupported_format",
            "format must be one of: json, csv, xlsx, pdf",
        );
    };

    let doc = match document_from_body(body) {
        Ok(doc) => doc,
        Err(resp) => return resp,
    };
    let normalized = match serde_json::to_value(&doc) {
        Ok(normalized) => normalized,
        Err(e) => {
            tracing::error!("failed to serialize normalized document: {e}");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "export_failed",
                "failed to encode export",
            );
        }
    };

    match export_invoice(&normalized, format) {
        Ok(output) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, output.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", output.filename),
                ),
            ],
            output.bytes,
        )
            .into_response(),
        Err(e) => errors::export_error_to_response(e),
    }
}

/// Email an already-rendered document uploaded by the client.
pub async fn send(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_current): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let mut email: Option<String> = None;
    let mut invoice_number: Option<String> = None;
    let mut file: Option<Attachment> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_form", e.to_string());
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("email") => email = field.text().await.ok(),
            Some("invoiceNumber") => invoice_number = field.text().await.ok(),
            Some("invoicePdf") => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let Ok(bytes) = field.bytes().await else {
                    return errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "invalid_form",
                        "failed to read attachment",
                    );
                };
                file = Some(Attachment {
                    filename: filename.unwrap_or_else(|| "invoice.pdf".to_string()),
                    content_type,
                    content: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let Some(recipient) = email.filter(|e| is_valid_email(e)) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_email", "a valid email is required");
    };
    let Some(attachment) = file else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing_file", "invoicePdf is required");
    };

    let subject = default_invoice_subject(invoice_number.as_deref());
    let message = invoice_email(&recipient, Some(&subject), None, attachment);

    match services.mailer.send(message).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response(),
        Err(e) => errors::mail_error_to_response(e),
    }
}

/// Render a stored invoice and email it to a recipient.
pub async fn email(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let Some(recipient) = body.get("recipient").and_then(Value::as_str).filter(|e| is_valid_email(e))
    else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_email", "a valid recipient is required");
    };
    let Some(raw_id) = body.get("invoiceId").and_then(Value::as_str) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invoiceId is required");
    };
    let Ok(id) = raw_id.parse::<InvoiceId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id");
    };
    let subject = body.get("subject").and_then(Value::as_str);
    let message = body.get("message").and_then(Value::as_str);

    let stored = match services.invoices.get(current.user_id(), id).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let html = match render_document(&stored.invoice) {
        Ok(html) => html,
        Err(resp) => return resp,
    };

    let number = stored.invoice.invoice_number().unwrap_or(raw_id);
    let attachment = Attachment {
        filename: format!("invoice-{number}.html"),
        content_type: "text/html".to_string(),
        content: html.into_bytes(),
    };

    let default_subject = default_invoice_subject(stored.invoice.invoice_number());
    let outbound = invoice_email(
        recipient,
        subject.or(Some(default_subject.as_str())),
        message,
        attachment,
    );

    match services.mailer.send(outbound).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response(),
        Err(e) => errors::mail_error_to_response(e),
    }
}

/// Extract invoice fields from free text. Open endpoint by design.
pub async fn parse_text(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let Some(text) = body.get("text").and_then(Value::as_str).filter(|t| !t.trim().is_empty())
    else {
        return errors::json_error(StatusCode::BAD_REQUEST, "text_required", "text is required");
    };

    let Some(parser) = services.parser.as_ref() else {
        return errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "parser_not_configured",
            "invoice parsing is not configured",
        );
    };

    match parser.parse_text(text).await {
        Ok(invoice) => {
            (StatusCode::OK, Json(serde_json::json!({ "invoice": invoice }))).into_response()
        }
        Err(e) => errors::parse_error_to_response(e),
    }
}

/// Extract invoice fields from an uploaded image. Open endpoint by design.
pub async fn parse_file(
    Extension(services): Extension<Arc<AppServices>>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let Some(parser) = services.parser.clone() else {
        return errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "parser_not_configured",
            "invoice parsing is not configured",
        );
    };

    let mut file: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_form", e.to_string());
            }
        };

        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let Ok(bytes) = field.bytes().await else {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_form", "failed to read file");
            };
            file = Some((content_type, bytes.to_vec()));
        }
    }

    let Some((content_type, bytes)) = file else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing_file", "file is required");
    };

    match parser.parse_image(&bytes, &content_type).await {
        Ok(invoice) => {
            (StatusCode::OK, Json(serde_json::json!({ "invoice": invoice }))).into_response()
        }
        Err(e) => errors::parse_error_to_response(e),
    }
}
