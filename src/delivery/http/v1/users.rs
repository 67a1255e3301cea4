use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::delivery::http::v1::middleware::AuthenticatedUser;
use crate::domain::user::User;
use crate::usecase::error::UsecaseError;
use crate::AppState;

/// Account view returned to the caller and to administrators.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub nickname: String,
    pub is_admin: bool,
    pub is_deactivated: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            nickname: user.nickname,
            is_admin: user.is_admin,
            is_deactivated: user.is_deactivated,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[tracing::instrument(skip(state), fields(email = %user.email))]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    let account = state.users_usecase.get_user(&user.email).await?;
    Ok((StatusCode::OK, Json(UserResponse::from(account))))
}
