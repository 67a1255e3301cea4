use chrono::{DateTime, Utc};

/// Account record owned by the identity provider; this service only reads it
/// and flips the moderation flags.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub email: String,
    pub nickname: String,
    pub is_admin: bool,
    pub is_deactivated: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown on lists and reviews; falls back to the email.
    pub fn display_name(&self) -> &str {
        if self.nickname.trim().is_empty() {
            &self.email
        } else {
            &self.nickname
        }
    }
}

#[cfg(test)]
pub(crate) fn make_user(email: &str, nickname: &str) -> User {
    User {
        email: email.to_string(),
        nickname: nickname.to_string(),
        is_admin: false,
        is_deactivated: false,
        is_verified: true,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = make_user("test@example.com", "tester");
        assert_eq!(user.display_name(), "tester");

        user.nickname = "  ".to_string();
        assert_eq!(user.display_name(), "test@example.com");

        user.nickname = String::new();
        assert_eq!(user.display_name(), "test@example.com");
    }
}
