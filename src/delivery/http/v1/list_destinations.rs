use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::delivery::http::v1::destinations::parse_destination_id;
use crate::delivery::http::v1::middleware::AuthenticatedUser;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddDestinationRequest {
    pub destination_id: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MergeDestinationsRequest {
    #[validate(length(min = 1, max = 500))]
    pub destination_ids: Vec<u32>,
}

#[derive(Serialize)]
pub struct MembershipResponse {
    pub name: String,
    pub destinations: Vec<u32>,
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn add_destination(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(name): Path<String>,
    Json(payload): Json<AddDestinationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling add destination request");

    let destination_id = payload
        .destination_id
        .ok_or_else(|| UsecaseError::Validation("Destination ID is required".to_string()))?;

    let destinations = state
        .membership_usecase
        .add_destination(&user.email, &name, destination_id)
        .await?;

    Ok((StatusCode::OK, Json(MembershipResponse { name, destinations })))
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn merge_destinations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(name): Path<String>,
    Json(payload): Json<MergeDestinationsRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling merge destinations request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(email = %user.email, ?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let destinations = state
        .membership_usecase
        .merge_destinations(&user.email, &name, &payload.destination_ids)
        .await?;

    Ok((StatusCode::OK, Json(MembershipResponse { name, destinations })))
}

#[tracing::instrument(skip(state), fields(email = %user.email))]
pub async fn remove_destination(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((name, destination_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling remove destination request");

    let destination_id = parse_destination_id(&destination_id)?;
    let destinations = state
        .membership_usecase
        .remove_destination(&user.email, &name, destination_id)
        .await?;

    Ok((StatusCode::OK, Json(MembershipResponse { name, destinations })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_request_requires_ids() {
        let empty: MergeDestinationsRequest =
            serde_json::from_value(serde_json::json!({ "destination_ids": [] })).unwrap();
        assert!(empty.validate().is_err());

        let some: MergeDestinationsRequest =
            serde_json::from_value(serde_json::json!({ "destination_ids": [3, 1, 3] })).unwrap();
        assert!(some.validate().is_ok());
    }

    #[test]
    fn test_add_request_tolerates_missing_id() {
        let payload: AddDestinationRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(payload.destination_id.is_none());
    }
}
