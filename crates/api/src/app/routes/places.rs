//! Address autocomplete proxy.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use billfold_places::PlacesClient;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/autocomplete", get(autocomplete))
        .route("/details", get(details))
}

fn client(services: &AppServices) -> Result<Arc<PlacesClient>, axum::response::Response> {
    services.places.clone().ok_or_else(|| {
        errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "places_not_configured",
            "address lookup is not configured",
        )
    })
}

pub async fn autocomplete(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::AutocompleteParams>,
) -> axum::response::Response {
    let Some(input) = params.input.filter(|i| !i.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing_input", "input parameter is required");
    };

    let places = match client(&services) {
        Ok(places) => places,
        Err(resp) => return resp,
    };

    match places.autocomplete(&input).await {
        Ok(suggestions) => {
            (StatusCode::OK, Json(serde_json::json!({ "suggestions": suggestions }))).into_response()
        }
        Err(e) => errors::places_error_to_response(e),
    }
}

pub async fn details(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::PlaceDetailsParams>,
) -> axum::response::Response {
    let Some(place_id) = params.place_id.filter(|p| !p.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "missing_place_id", "placeId parameter is required");
    };

    let places = match client(&services) {
        Ok(places) => places,
        Err(resp) => return resp,
    };

    match places.details(&place_id).await {
        Ok(address) => {
            (StatusCode::OK, Json(serde_json::json!({ "addressDetails": address }))).into_response()
        }
        Err(e) => errors::places_error_to_response(e),
    }
}
