use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::delivery::http::v1::middleware::{require_admin, AuthenticatedUser};
use crate::delivery::http::v1::users::UserResponse;
use crate::usecase::error::UsecaseError;
use crate::usecase::reviews::ReviewEntry;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub is_deactivated: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetReviewVisibilityRequest {
    pub is_visible: bool,
}

#[derive(Serialize)]
pub struct AdminReviewResponse {
    pub list_name: String,
    pub index: usize,
    pub id: Uuid,
    pub rating: f64,
    pub comment: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub is_visible: bool,
}

impl From<ReviewEntry> for AdminReviewResponse {
    fn from(entry: ReviewEntry) -> Self {
        Self {
            list_name: entry.list_name,
            index: entry.index,
            id: entry.review.id,
            rating: entry.review.rating,
            comment: entry.review.comment,
            author_name: entry.review.author_name,
            created_at: entry.review.created_at,
            is_visible: entry.review.is_visible,
        }
    }
}

#[tracing::instrument(skip(state), fields(email = %user.email))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    let users = state.users_usecase.list_users().await?;
    let response: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    tracing::debug!(count = response.len(), "users listed");
    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn set_user_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(target): Path<String>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    state
        .users_usecase
        .set_deactivated(&target, payload.is_deactivated)
        .await?;

    tracing::info!(admin = %user.email, %target, is_deactivated = payload.is_deactivated, "user status changed by admin");
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn set_user_admin(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(target): Path<String>,
    Json(payload): Json<SetAdminRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    state
        .users_usecase
        .set_admin(&user.email, &target, payload.is_admin)
        .await?;

    tracing::info!(admin = %user.email, %target, is_admin = payload.is_admin, "admin flag changed");
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state), fields(email = %user.email))]
pub async fn list_all_reviews(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    let entries = state.reviews_usecase.all_reviews().await?;
    let response: Vec<AdminReviewResponse> =
        entries.into_iter().map(AdminReviewResponse::from).collect();

    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn set_review_visibility(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((list_name, index)): Path<(String, usize)>,
    Json(payload): Json<SetReviewVisibilityRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    state
        .reviews_usecase
        .set_review_visibility(&list_name, index, payload.is_visible)
        .await?;

    tracing::info!(admin = %user.email, %list_name, index, is_visible = payload.is_visible, "review moderated");
    Ok(StatusCode::NO_CONTENT)
}
