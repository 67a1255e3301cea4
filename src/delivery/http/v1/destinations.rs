use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::usecase::destinations::SearchCriteria;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// Kept as text so a malformed value is reported with the search error message.
    #[serde(alias = "limit")]
    pub n: Option<String>,
}

#[derive(Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<String>,
}

pub(crate) fn parse_destination_id(raw: &str) -> Result<u32, UsecaseError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| UsecaseError::Validation("Invalid destination ID".to_string()))
}

#[tracing::instrument(skip(state))]
pub async fn search_destinations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling destination search request");

    let criteria = SearchCriteria {
        name: query.name,
        region: query.region,
        country: query.country,
    };

    let found = state
        .destinations_usecase
        .search(&criteria, query.n.as_deref())?;

    tracing::debug!(count = found.len(), "destination search completed");
    Ok((StatusCode::OK, Json(found)))
}

#[tracing::instrument(skip(state))]
pub async fn list_countries(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, UsecaseError> {
    let countries = state.destinations_usecase.countries()?;
    Ok((StatusCode::OK, Json(CountriesResponse { countries })))
}

#[tracing::instrument(skip(state))]
pub async fn get_destination(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let id = parse_destination_id(&id)?;
    let destination = state.destinations_usecase.get(id)?;
    Ok((StatusCode::OK, Json(destination.clone())))
}

#[tracing::instrument(skip(state))]
pub async fn get_coordinates(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let id = parse_destination_id(&id)?;
    let coordinates = state.destinations_usecase.coordinates(id)?;
    Ok((StatusCode::OK, Json(coordinates)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_destination_id() {
        assert_eq!(parse_destination_id("12").unwrap(), 12);
        assert_eq!(parse_destination_id(" 3 ").unwrap(), 3);
        for raw in ["abc", "-1", "", "1.5"] {
            assert!(matches!(
                parse_destination_id(raw),
                Err(UsecaseError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_search_query_accepts_limit_alias() {
        let query: SearchQuery =
            serde_json::from_value(serde_json::json!({ "name": "Paris", "limit": "3" })).unwrap();

        assert_eq!(query.name.as_deref(), Some("Paris"));
        assert_eq!(query.n.as_deref(), Some("3"));
        assert!(query.region.is_none());
    }
}
