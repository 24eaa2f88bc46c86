//! `billfold-places` — address autocomplete wrapper.
//!
//! Thin client for a Places-style HTTP API: free-text input to suggestions,
//! then a place ID to a structured postal address.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API base; override for a proxy or a compatible service.
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place";

/// Longest input/place ID the upstream accepts.
pub const MAX_INPUT_LEN: usize = 500;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("input is empty or too long")]
    InvalidInput,

    #[error("places transport error: {0}")]
    Transport(String),

    #[error("places service error: {0}")]
    Service(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSuggestion {
    pub place_id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize, Default)]
struct AddressComponent {
    #[serde(default)]
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PlaceDetailsResult {
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetailsResult>,
}

/// Client for the autocomplete/details endpoints.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Suggestions for a partially typed address.
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<AddressSuggestion>, PlacesError> {
        if input.is_empty() || input.len() > MAX_INPUT_LEN {
            return Err(PlacesError::InvalidInput);
        }

        let url = format!("{}/autocomplete/json", self.endpoint);
        let response = self
            .http
            .get(url)
            .query(&[("input", input), ("types", "address"), ("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?;

        let body: AutocompleteResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?;

        // ZERO_RESULTS is a successful empty answer, not a failure.
        if body.status != "OK" && body.status != "ZERO_RESULTS" {
            return Err(PlacesError::Service(
                body.error_message.unwrap_or(body.status),
            ));
        }

        Ok(body
            .predictions
            .into_iter()
            .map(|p| AddressSuggestion { place_id: p.place_id, description: p.description })
            .collect())
    }

    /// Structured postal address for a selected suggestion.
    pub async fn details(&self, place_id: &str) -> Result<AddressDetails, PlacesError> {
        if place_id.is_empty() || place_id.len() > MAX_INPUT_LEN {
            return Err(PlacesError::InvalidInput);
        }

        let url = format!("{}/details/json", self.endpoint);
        let response = self
            .http
            .get(url)
            .query(&[
                ("place_id", place_id),
                ("fields", "address_component,formatted_address"),
                ("key", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?;

        let body: PlaceDetailsResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?;

        if body.status != "OK" {
            return Err(PlacesError::Service(
                body.error_message.unwrap_or(body.status),
            ));
        }

        Ok(assemble_address(body.result.unwrap_or_default()))
    }
}

fn component<'a>(components: &'a [AddressComponent], kind: &str) -> Option<&'a AddressComponent> {
    components.iter().find(|c| c.types.iter().any(|t| t == kind))
}

fn assemble_address(result: PlaceDetailsResult) -> AddressDetails {
    let components = &result.address_components;

    let street_number = component(components, "street_number").map(|c| c.long_name.as_str());
    let route = component(components, "route").map(|c| c.long_name.as_str());
    let street = match (street_number, route) {
        (Some(number), Some(route)) => format!("{number} {route}"),
        (None, Some(route)) => route.to_string(),
        _ => String::new(),
    };

    AddressDetails {
        // Fall back to the formatted address when components are too sparse.
        address: if street.is_empty() {
            result.formatted_address.clone().unwrap_or_default()
        } else {
            street
        },
        city: component(components, "locality")
            .or_else(|| component(components, "postal_town"))
            .map(|c| c.long_name.clone())
            .unwrap_or_default(),
        zip_code: component(components, "postal_code")
            .map(|c| c.long_name.clone())
            .unwrap_or_default(),
        country: component(components, "country")
            .map(|c| c.long_name.clone())
            .unwrap_or_default(),
    }
}
