use crate::{
    domain::list::TravelList, domain::review::Review, domain::user::User,
    repository::errors::RepositoryError,
};

#[cfg_attr(test, mockall::automock)]
pub trait ListRepository: Send + Sync {
    async fn create(&self, list: &TravelList) -> Result<(), RepositoryError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<TravelList>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<TravelList>, RepositoryError>;
    async fn find_by_creator(&self, email: &str) -> Result<Vec<TravelList>, RepositoryError>;
    async fn update(&self, list: &TravelList) -> Result<(), RepositoryError>;
    /// Moves the stored `old_name` record to `list.name` as one unit and returns it.
    ///
    /// Only name, description, visibility and `updated_at` come from `list`; members,
    /// reviews and the average are taken from the locked stored row.
    async fn rename(&self, old_name: &str, list: &TravelList) -> Result<TravelList, RepositoryError>;
    async fn delete(&self, name: &str) -> Result<(), RepositoryError>;
    /// Appends the review and stores the recomputed average together; returns the new average.
    async fn append_review(&self, name: &str, review: &Review) -> Result<f64, RepositoryError>;
    async fn set_review_visibility(
        &self,
        name: &str,
        index: usize,
        visible: bool,
    ) -> Result<(), RepositoryError>;
    /// Appends the ids the stored list lacks, under a row lock; returns the stored members.
    async fn add_destinations(&self, name: &str, ids: &[u32]) -> Result<Vec<u32>, RepositoryError>;
    /// Drops `id` from the stored list under a row lock; returns the stored members.
    async fn remove_destination(&self, name: &str, id: u32) -> Result<Vec<u32>, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
    async fn set_deactivated(&self, email: &str, deactivated: bool) -> Result<(), RepositoryError>;
    async fn set_admin(&self, email: &str, is_admin: bool) -> Result<(), RepositoryError>;
}
