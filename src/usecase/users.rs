use crate::domain::user::User;
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::UserRepository;
use crate::usecase::error::UsecaseError;

fn map_user_error(err: RepositoryError) -> UsecaseError {
    match err {
        RepositoryError::NotFound => UsecaseError::NotFound("User".to_string()),
        other => other.into(),
    }
}

pub struct UsersUseCase<U>
where
    U: UserRepository,
{
    user_repository: U,
}

impl<U> UsersUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repository: U) -> Self {
        Self { user_repository }
    }

    /// Resolves the account behind a verified token subject.
    #[tracing::instrument(skip(self))]
    pub async fn authenticate(&self, email: &str) -> Result<User, UsecaseError> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UsecaseError::Unauthenticated("Unknown account".to_string()))?;

        if user.is_deactivated {
            tracing::warn!(email, "deactivated account attempted access");
            return Err(UsecaseError::Forbidden("Account is deactivated.".to_string()));
        }

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, email: &str) -> Result<User, UsecaseError> {
        self.user_repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("User".to_string()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, UsecaseError> {
        tracing::debug!("listing users");
        let users = self.user_repository.find_all().await?;
        tracing::debug!(count = users.len(), "retrieved users");
        Ok(users)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_deactivated(&self, email: &str, deactivated: bool) -> Result<(), UsecaseError> {
        self.user_repository
            .set_deactivated(email, deactivated)
            .await
            .map_err(map_user_error)?;

        tracing::info!(email, deactivated, "user status updated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_admin(
        &self,
        requester_email: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<(), UsecaseError> {
        if requester_email == email && !is_admin {
            return Err(UsecaseError::Validation(
                "Administrators cannot remove their own admin status".to_string(),
            ));
        }

        self.user_repository
            .set_admin(email, is_admin)
            .await
            .map_err(map_user_error)?;

        tracing::info!(email, is_admin, "user admin flag updated");
        Ok(())
    }
}
