use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::usecase::error::UsecaseError;
use crate::{usecase::jwt::TokenType, AppState};

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub email: String,
    /// Nickname, or the email when the account has none.
    pub display_name: String,
    pub is_admin: bool,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, UsecaseError> {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::warn!("missing or invalid authorization header");
        return Err(UsecaseError::Unauthenticated(
            "Unauthorized access. Token is missing.".to_string(),
        ));
    };

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        tracing::warn!(?e, "invalid token");
        UsecaseError::Unauthenticated("Invalid or expired token.".to_string())
    })?;

    if claims.token_type != TokenType::Access {
        tracing::warn!("attempted to use non-access token for authentication");
        return Err(UsecaseError::Unauthenticated("Invalid token type".to_string()));
    }

    let user = state.users_usecase.authenticate(&claims.sub).await?;

    let authenticated_user = AuthenticatedUser {
        display_name: user.display_name().to_string(),
        email: user.email,
        is_admin: user.is_admin,
    };

    tracing::debug!(?authenticated_user, "user authenticated successfully");
    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

pub(crate) fn require_admin(user: &AuthenticatedUser) -> Result<(), UsecaseError> {
    if !user.is_admin {
        tracing::warn!(email = %user.email, "non-admin access attempt to admin endpoint");
        return Err(UsecaseError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_require_admin() {
        let mut user = AuthenticatedUser {
            email: "user@example.com".to_string(),
            display_name: "user".to_string(),
            is_admin: false,
        };
        assert!(matches!(require_admin(&user), Err(UsecaseError::Forbidden(_))));

        user.is_admin = true;
        assert!(require_admin(&user).is_ok());
    }
}
