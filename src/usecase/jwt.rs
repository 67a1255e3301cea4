use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to validate token: {0}")]
    TokenValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

/// Claims issued by the external identity provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // account email
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Clone)]
pub struct JwtService {
    secret: String,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = jsonwebtoken::Validation::default();
        validation.validate_exp = true;

        let token_data = jsonwebtoken::decode::<Claims>(
            token,
            &jsonwebtoken::DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::TokenValidationError(e.to_string()),
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn issue(token_type: TokenType, lifetime: Duration, secret: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: "user@example.com".to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            token_type,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_access_token() {
        let service = JwtService::new(SECRET.to_string());
        let token = issue(TokenType::Access, Duration::minutes(15), SECRET);

        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_refresh_token_keeps_its_type() {
        let service = JwtService::new(SECRET.to_string());
        let token = issue(TokenType::Refresh, Duration::days(7), SECRET);

        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(SECRET.to_string());
        let token = issue(TokenType::Access, Duration::hours(-2), SECRET);

        let result = service.validate_token(&token);

        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_and_garbage() {
        let service = JwtService::new(SECRET.to_string());
        let token = issue(TokenType::Access, Duration::minutes(15), "other-secret");

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::TokenValidationError(_))
        ));
        assert!(service.validate_token("invalid.token.here").is_err());
    }
}
