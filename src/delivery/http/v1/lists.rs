use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::delivery::http::v1::middleware::AuthenticatedUser;
use crate::domain::destination::Destination;
use crate::domain::list::TravelList;
use crate::domain::review::Review;
use crate::usecase::error::UsecaseError;
use crate::usecase::lists::ListChanges;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub name: String,
    pub description: String,
    pub creator_nickname: String,
    pub is_visible: bool,
    pub destinations: Vec<u32>,
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ListDetailsResponse {
    #[serde(flatten)]
    pub list: ListResponse,
    pub destination_details: Vec<Destination>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateListRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_visible: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetVisibilityRequest {
    pub is_visible: bool,
}

/// Hidden reviews never leave the server through list reads.
pub(crate) fn list_to_response(list: TravelList) -> ListResponse {
    let reviews = list.visible_reviews().into_iter().cloned().collect();
    ListResponse {
        name: list.name,
        description: list.description,
        creator_nickname: list.creator_nickname,
        is_visible: list.is_visible,
        destinations: list.destinations,
        reviews,
        average_rating: list.average_rating,
        created_at: list.created_at,
        updated_at: list.updated_at,
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_public_lists(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling list public lists request");

    let lists = state.lists_usecase.get_public_lists().await?;
    let response: Vec<ListResponse> = lists.into_iter().map(list_to_response).collect();

    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state), fields(email = %user.email))]
pub async fn list_my_lists(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling list own lists request");

    let lists = state.lists_usecase.get_user_lists(&user.email).await?;
    let response: Vec<ListResponse> = lists.into_iter().map(list_to_response).collect();

    tracing::debug!(count = response.len(), "own lists listed successfully");
    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state))]
pub async fn get_list(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let list = state.lists_usecase.get_list(&name).await?;
    Ok((StatusCode::OK, Json(list_to_response(list))))
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateListRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create list request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(email = %user.email, ?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let list = state
        .lists_usecase
        .create_list(
            &user.email,
            &user.display_name,
            payload.name,
            payload.description,
            payload.is_visible,
        )
        .await?;

    tracing::debug!(name = %list.name, "list created successfully");
    Ok((StatusCode::CREATED, Json(list_to_response(list))))
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn update_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(name): Path<String>,
    Json(payload): Json<UpdateListRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling update list request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(email = %user.email, ?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let changes = ListChanges {
        name: payload.name,
        description: payload.description,
        is_visible: payload.is_visible,
    };
    let list = state
        .lists_usecase
        .update_list(&user.email, &name, changes)
        .await?;

    tracing::debug!(name = %list.name, "list updated successfully");
    Ok((StatusCode::OK, Json(list_to_response(list))))
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn set_list_visibility(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(name): Path<String>,
    Json(payload): Json<SetVisibilityRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    let list = state
        .lists_usecase
        .set_visibility(&user.email, &name, payload.is_visible)
        .await?;

    Ok((StatusCode::OK, Json(list_to_response(list))))
}

#[tracing::instrument(skip(state), fields(email = %user.email))]
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling delete list request");

    state.lists_usecase.delete_list(&user.email, &name).await?;

    tracing::debug!(%name, "list deleted successfully");
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn get_list_details(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let (list, destination_details) = state.membership_usecase.list_details(&name).await?;

    Ok((
        StatusCode::OK,
        Json(ListDetailsResponse {
            list: list_to_response(list),
            destination_details,
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn get_list_geojson(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let collection = state.membership_usecase.list_geojson(&name).await?;
    Ok((StatusCode::OK, Json(collection)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let ok: CreateListRequest =
            serde_json::from_value(serde_json::json!({ "name": "Summer" })).unwrap();
        assert!(ok.validate().is_ok());
        assert!(!ok.is_visible);

        let too_long = CreateListRequest {
            name: "x".repeat(51),
            description: None,
            is_visible: true,
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_update_request_allows_partial_payload() {
        let payload: UpdateListRequest =
            serde_json::from_value(serde_json::json!({ "is_visible": true })).unwrap();

        assert!(payload.validate().is_ok());
        assert!(payload.name.is_none());
        assert_eq!(payload.is_visible, Some(true));

        let empty_name = UpdateListRequest {
            name: Some(String::new()),
            description: None,
            is_visible: None,
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_response_hides_moderated_reviews() {
        let mut list = TravelList::new(
            "Trip".to_string(),
            String::new(),
            "owner@example.com".to_string(),
            "owner".to_string(),
            true,
        );
        list.add_review(Review::new(5.0, "great".to_string(), "a".to_string()));
        list.add_review(Review::new(1.0, "spam".to_string(), "b".to_string()));
        list.set_review_visibility(1, false);

        let response = list_to_response(list);

        assert_eq!(response.reviews.len(), 1);
        assert_eq!(response.reviews[0].comment, "great");
        assert_eq!(response.average_rating, 3.0);
    }
}
