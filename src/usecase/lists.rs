use crate::domain::list::{TravelList, MAX_LIST_NAME_LEN};
use crate::repository::errors::RepositoryError;
use crate::usecase::contracts::ListRepository;
use crate::usecase::error::UsecaseError;

/// Partial update of a list. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct ListChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_visible: Option<bool>,
}

pub fn validate_list_name(name: &str) -> Result<(), UsecaseError> {
    if name.trim().is_empty() || name.chars().count() > MAX_LIST_NAME_LEN || name.contains('/') {
        return Err(UsecaseError::Validation(format!(
            "Invalid list name. Must be up to {MAX_LIST_NAME_LEN} characters long, non-empty, and cannot contain \"/\"."
        )));
    }
    Ok(())
}

pub(crate) fn list_not_found(name: &str) -> UsecaseError {
    UsecaseError::NotFound(format!("List \"{name}\""))
}

pub(crate) fn ensure_owner(list: &TravelList, email: &str, action: &str) -> Result<(), UsecaseError> {
    if !list.is_owned_by(email) {
        tracing::warn!(list_name = %list.name, requester = %email, action, "unauthorized list access attempt");
        return Err(UsecaseError::Forbidden(format!(
            "You do not have permission to {action} this list."
        )));
    }
    Ok(())
}

/// Maps a missing row to a list-specific not-found error.
pub(crate) fn map_list_error(name: &str) -> impl Fn(RepositoryError) -> UsecaseError + '_ {
    move |e| match e {
        RepositoryError::NotFound => list_not_found(name),
        other => other.into(),
    }
}

pub struct ListsUseCase<L>
where
    L: ListRepository,
{
    list_repository: L,
}

impl<L> ListsUseCase<L>
where
    L: ListRepository,
{
    pub fn new(list_repository: L) -> Self {
        Self { list_repository }
    }

    async fn find_list(&self, name: &str) -> Result<TravelList, UsecaseError> {
        self.list_repository
            .find_by_name(name)
            .await?
            .ok_or_else(|| list_not_found(name))
    }

    #[tracing::instrument(skip(self, description), fields(creator = %creator_email))]
    pub async fn create_list(
        &self,
        creator_email: &str,
        creator_nickname: &str,
        name: String,
        description: Option<String>,
        is_visible: bool,
    ) -> Result<TravelList, UsecaseError> {
        tracing::debug!("creating new list");

        validate_list_name(&name)?;

        if self.list_repository.find_by_name(&name).await?.is_some() {
            return Err(UsecaseError::Conflict(format!("List \"{name}\" already exists.")));
        }

        let list = TravelList::new(
            name,
            description.unwrap_or_default(),
            creator_email.to_string(),
            creator_nickname.to_string(),
            is_visible,
        );
        self.list_repository.create(&list).await.map_err(|e| match e {
            RepositoryError::Conflict => {
                UsecaseError::Conflict(format!("List \"{}\" already exists.", list.name))
            }
            other => other.into(),
        })?;

        metrics::counter!("lists_created_total").increment(1);
        tracing::info!(list_name = %list.name, "list created successfully");
        Ok(list)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_list(&self, name: &str) -> Result<TravelList, UsecaseError> {
        tracing::debug!("getting list");
        self.find_list(name).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_public_lists(&self) -> Result<Vec<TravelList>, UsecaseError> {
        tracing::debug!("getting public lists");

        let lists: Vec<TravelList> = self
            .list_repository
            .find_all()
            .await?
            .into_iter()
            .filter(|l| l.is_visible)
            .collect();

        tracing::debug!(count = lists.len(), "retrieved public lists");
        Ok(lists)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user_lists(&self, email: &str) -> Result<Vec<TravelList>, UsecaseError> {
        tracing::debug!("getting user lists");

        let lists = self.list_repository.find_by_creator(email).await?;

        tracing::debug!(count = lists.len(), "retrieved user lists");
        Ok(lists)
    }

    /// Updates description and visibility, renaming when a different name is given.
    ///
    /// A rename moves the whole record to the new key; the old key is gone afterwards.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_list(
        &self,
        requester_email: &str,
        name: &str,
        changes: ListChanges,
    ) -> Result<TravelList, UsecaseError> {
        tracing::debug!("updating list");

        let mut list = self.find_list(name).await?;
        ensure_owner(&list, requester_email, "edit")?;

        let new_name = changes.name.filter(|n| n != name);
        if let Some(new_name) = &new_name {
            validate_list_name(new_name)?;
            if self.list_repository.find_by_name(new_name).await?.is_some() {
                return Err(UsecaseError::Conflict(format!(
                    "List \"{new_name}\" already exists."
                )));
            }
        }

        list.update(changes.description, changes.is_visible);

        let list = match new_name {
            Some(new_name) => {
                list.name = new_name;
                let renamed = self
                    .list_repository
                    .rename(name, &list)
                    .await
                    .map_err(|e| match e {
                        RepositoryError::Conflict => UsecaseError::Conflict(format!(
                            "List \"{}\" already exists.",
                            list.name
                        )),
                        RepositoryError::NotFound => list_not_found(name),
                        other => other.into(),
                    })?;
                metrics::counter!("list_renames_total").increment(1);
                tracing::info!(old_name = %name, new_name = %renamed.name, "list renamed");
                renamed
            }
            None => {
                self.list_repository
                    .update(&list)
                    .await
                    .map_err(map_list_error(name))?;
                list
            }
        };

        tracing::info!(list_name = %list.name, "list updated successfully");
        Ok(list)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_visibility(
        &self,
        requester_email: &str,
        name: &str,
        is_visible: bool,
    ) -> Result<TravelList, UsecaseError> {
        tracing::debug!("setting list visibility");

        let mut list = self.find_list(name).await?;
        ensure_owner(&list, requester_email, "edit")?;

        list.update(None, Some(is_visible));
        self.list_repository
            .update(&list)
            .await
            .map_err(map_list_error(name))?;

        tracing::info!(list_name = %name, is_visible, "list visibility updated");
        Ok(list)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_list(&self, requester_email: &str, name: &str) -> Result<(), UsecaseError> {
        tracing::debug!("deleting list");

        let list = self.find_list(name).await?;
        ensure_owner(&list, requester_email, "delete")?;

        self.list_repository
            .delete(name)
            .await
            .map_err(map_list_error(name))?;

        tracing::info!(list_name = %name, "list deleted successfully");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn make_list(name: &str, owner: &str) -> TravelList {
    TravelList::new(
        name.to_string(),
        String::new(),
        owner.to_string(),
        "owner".to_string(),
        true,
    )
}
