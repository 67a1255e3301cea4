use std::sync::Arc;

use geojson::FeatureCollection;

use crate::domain::destination::{Catalog, Destination};
use crate::domain::list::TravelList;
use crate::usecase::contracts::ListRepository;
use crate::usecase::error::UsecaseError;
use crate::usecase::geojson_export::build_feature_collection;
use crate::usecase::lists::{ensure_owner, list_not_found, map_list_error};

/// Adds, removes and resolves the destination ids a list refers to.
pub struct MembershipUseCase<L>
where
    L: ListRepository,
{
    list_repository: L,
    catalog: Arc<Catalog>,
}

impl<L> MembershipUseCase<L>
where
    L: ListRepository,
{
    pub fn new(list_repository: L, catalog: Arc<Catalog>) -> Self {
        Self {
            list_repository,
            catalog,
        }
    }

    async fn find_list(&self, name: &str) -> Result<TravelList, UsecaseError> {
        self.list_repository
            .find_by_name(name)
            .await?
            .ok_or_else(|| list_not_found(name))
    }

    fn ensure_destination_exists(&self, id: u32) -> Result<(), UsecaseError> {
        if !self.catalog.is_loaded() {
            return Err(UsecaseError::Unavailable(
                "Destination data is not yet loaded".to_string(),
            ));
        }
        if !self.catalog.contains(id) {
            return Err(UsecaseError::NotFound(format!("Destination {id}")));
        }
        Ok(())
    }

    /// Returns the membership set after the append.
    #[tracing::instrument(skip(self))]
    pub async fn add_destination(
        &self,
        requester_email: &str,
        list_name: &str,
        destination_id: u32,
    ) -> Result<Vec<u32>, UsecaseError> {
        tracing::debug!("adding destination to list");

        let list = self.find_list(list_name).await?;
        ensure_owner(&list, requester_email, "modify")?;
        self.ensure_destination_exists(destination_id)?;

        if list.has_destination(destination_id) {
            return Err(UsecaseError::Validation(
                "Destination already in list".to_string(),
            ));
        }

        let destinations = self
            .list_repository
            .add_destinations(list_name, &[destination_id])
            .await
            .map_err(map_list_error(list_name))?;

        tracing::info!(list_name, destination_id, "destination added to list");
        Ok(destinations)
    }

    /// Appends every id not already present. Unknown ids reject the whole batch.
    #[tracing::instrument(skip(self, destination_ids), fields(batch = destination_ids.len()))]
    pub async fn merge_destinations(
        &self,
        requester_email: &str,
        list_name: &str,
        destination_ids: &[u32],
    ) -> Result<Vec<u32>, UsecaseError> {
        tracing::debug!("merging destinations into list");

        if destination_ids.is_empty() {
            return Err(UsecaseError::Validation(
                "destination_ids must be a non-empty array".to_string(),
            ));
        }

        let mut list = self.find_list(list_name).await?;
        ensure_owner(&list, requester_email, "modify")?;
        for &id in destination_ids {
            self.ensure_destination_exists(id)?;
        }

        if list.merge_destinations(destination_ids) == 0 {
            tracing::debug!(list_name, "no new destinations to merge");
            return Ok(list.destinations);
        }

        let destinations = self
            .list_repository
            .add_destinations(list_name, destination_ids)
            .await
            .map_err(map_list_error(list_name))?;

        tracing::info!(list_name, count = destinations.len(), "destinations merged into list");
        Ok(destinations)
    }

    /// Removing an id that is not a member succeeds and leaves the set as it was.
    #[tracing::instrument(skip(self))]
    pub async fn remove_destination(
        &self,
        requester_email: &str,
        list_name: &str,
        destination_id: u32,
    ) -> Result<Vec<u32>, UsecaseError> {
        tracing::debug!("removing destination from list");

        let list = self.find_list(list_name).await?;
        ensure_owner(&list, requester_email, "modify")?;

        if !list.has_destination(destination_id) {
            tracing::debug!(list_name, destination_id, "destination was not a member");
            return Ok(list.destinations);
        }

        let destinations = self
            .list_repository
            .remove_destination(list_name, destination_id)
            .await
            .map_err(map_list_error(list_name))?;

        tracing::info!(list_name, destination_id, "destination removed from list");
        Ok(destinations)
    }

    /// Full records of the members in list order. Ids the catalog no longer
    /// knows are dropped rather than failing the request.
    #[tracing::instrument(skip(self))]
    pub async fn list_details(
        &self,
        list_name: &str,
    ) -> Result<(TravelList, Vec<Destination>), UsecaseError> {
        tracing::debug!("resolving list destinations");

        let list = self.find_list(list_name).await?;
        let destinations: Vec<Destination> = self.resolve(&list).cloned().collect();

        let dropped = list.destinations.len() - destinations.len();
        if dropped > 0 {
            tracing::warn!(list_name, dropped, "list refers to unknown destinations");
        }

        Ok((list, destinations))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_geojson(&self, list_name: &str) -> Result<FeatureCollection, UsecaseError> {
        tracing::debug!("exporting list as GeoJSON");

        let list = self.find_list(list_name).await?;
        Ok(build_feature_collection(&list.name, self.resolve(&list)))
    }

    fn resolve<'a>(&'a self, list: &'a TravelList) -> impl Iterator<Item = &'a Destination> + 'a {
        list.destinations.iter().filter_map(|&id| self.catalog.get(id))
    }
}
