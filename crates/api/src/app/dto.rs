use serde::Deserialize;

use billfold_auth::User;
use billfold_store::ListQuery;

// -------------------------
// Request parameter types
// -------------------------

/// Query parameters for `GET /invoices`.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        ListQuery {
            page: params.page,
            limit: params.limit,
            status: params.status,
            search: params.search,
        }
    }
}

/// Query parameters for `POST /invoice/export`.
#[derive(Debug, Deserialize, Default)]
pub struct ExportParams {
    pub format: Option<String>,
}

/// Query parameters for `GET /places/autocomplete`.
#[derive(Debug, Deserialize, Default)]
pub struct AutocompleteParams {
    pub input: Option<String>,
}

/// Query parameters for `GET /places/details`.
#[derive(Debug, Deserialize, Default)]
pub struct PlaceDetailsParams {
    #[serde(rename = "placeId")]
    pub place_id: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Public shape of an account (never includes verification timestamps).
pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "email": user.email,
        "name": user.name,
        "image": user.image,
        "role": user.role.as_str(),
    })
}
