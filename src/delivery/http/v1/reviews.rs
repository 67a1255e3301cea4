use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::delivery::http::v1::middleware::AuthenticatedUser;
use crate::domain::review::Review;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct AddReviewRequest {
    /// Left untyped so a non-numeric value is answered with a rating error.
    pub rating: Option<serde_json::Value>,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl AddReviewRequest {
    /// Numbers pass through; numeric strings are parsed. Anything else is `None`.
    fn rating_value(&self) -> Option<f64> {
        match self.rating.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub struct AddReviewResponse {
    pub review: Review,
    pub average_rating: f64,
}

#[tracing::instrument(skip(state, payload), fields(email = %user.email))]
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(name): Path<String>,
    Json(payload): Json<AddReviewRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling add review request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(email = %user.email, ?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }
    let rating = payload.rating_value().ok_or_else(|| {
        UsecaseError::Validation("Rating must be a number between 0 and 5.".to_string())
    })?;

    let (review, average_rating) = state
        .reviews_usecase
        .add_review(&name, &user.display_name, rating, payload.comment)
        .await?;

    tracing::debug!(list_name = %name, average_rating, "review added");
    Ok((
        StatusCode::CREATED,
        Json(AddReviewResponse {
            review,
            average_rating,
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, UsecaseError> {
    let reviews = state.reviews_usecase.list_reviews(&name).await?;
    Ok((StatusCode::OK, Json(reviews)))
}
