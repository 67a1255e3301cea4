use std::sync::Arc;

use crate::domain::destination::{Catalog, Coordinates, Destination};
use crate::usecase::error::UsecaseError;
use crate::usecase::matching::matches;

pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl SearchCriteria {
    fn is_empty(&self) -> bool {
        [&self.name, &self.region, &self.country]
            .iter()
            .all(|field| field.as_deref().is_none_or(str::is_empty))
    }
}

/// Parses the optional result cap; absent or blank means [`DEFAULT_SEARCH_LIMIT`].
pub fn parse_limit(raw: Option<&str>) -> Result<usize, UsecaseError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(DEFAULT_SEARCH_LIMIT);
    }
    match raw.parse::<usize>() {
        Ok(limit) if limit >= 1 => Ok(limit),
        _ => Err(UsecaseError::Validation(
            "Invalid value for n. Must be a positive number.".to_string(),
        )),
    }
}

pub struct DestinationsUseCase {
    catalog: Arc<Catalog>,
}

impl DestinationsUseCase {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn loaded_catalog(&self) -> Result<&Catalog, UsecaseError> {
        if !self.catalog.is_loaded() {
            return Err(UsecaseError::Unavailable(
                "Destination data is not yet loaded".to_string(),
            ));
        }
        Ok(&self.catalog)
    }

    /// Keeps catalog order and stops at the parsed `limit`; there is no relevance ranking.
    /// A missing criterion is reported before a malformed limit.
    #[tracing::instrument(skip(self))]
    pub fn search(
        &self,
        criteria: &SearchCriteria,
        limit: Option<&str>,
    ) -> Result<Vec<Destination>, UsecaseError> {
        tracing::debug!("searching destinations");

        if criteria.is_empty() {
            metrics::counter!("destination_searches_total", "outcome" => "invalid").increment(1);
            return Err(UsecaseError::Validation(
                "At least one search criterion (name, region, or country) must be provided"
                    .to_string(),
            ));
        }
        let limit = parse_limit(limit).inspect_err(|_| {
            metrics::counter!("destination_searches_total", "outcome" => "invalid").increment(1);
        })?;

        let catalog = self.loaded_catalog()?;

        let found: Vec<Destination> = catalog
            .iter()
            .filter(|d| {
                matches(criteria.name.as_deref(), &d.name)
                    && matches(criteria.region.as_deref(), &d.region)
                    && matches(criteria.country.as_deref(), &d.country)
            })
            .take(limit)
            .cloned()
            .collect();

        if found.is_empty() {
            metrics::counter!("destination_searches_total", "outcome" => "empty").increment(1);
            return Err(UsecaseError::NotFound("Matching destination".to_string()));
        }

        metrics::counter!("destination_searches_total", "outcome" => "found").increment(1);
        tracing::debug!(count = found.len(), "destinations found");
        Ok(found)
    }

    #[tracing::instrument(skip(self))]
    pub fn get(&self, id: u32) -> Result<&Destination, UsecaseError> {
        let catalog = self.loaded_catalog()?;

        if id < 1 || usize::try_from(id).map_or(true, |i| i > catalog.len()) {
            tracing::warn!(id, "invalid destination id");
            return Err(UsecaseError::Validation("Invalid destination ID".to_string()));
        }

        catalog
            .get(id)
            .ok_or_else(|| UsecaseError::NotFound("Destination".to_string()))
    }

    #[tracing::instrument(skip(self))]
    pub fn coordinates(&self, id: u32) -> Result<Coordinates, UsecaseError> {
        let destination = self.get(id)?;

        destination.coordinates().ok_or_else(|| {
            tracing::warn!(id, "coordinates not available");
            UsecaseError::NotFound("Coordinates".to_string())
        })
    }

    pub fn countries(&self) -> Result<Vec<String>, UsecaseError> {
        let catalog = self.loaded_catalog()?;
        Ok(catalog.countries().into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::destination::sample_destination;

    fn usecase() -> DestinationsUseCase {
        DestinationsUseCase::new(Arc::new(Catalog::new(vec![
            sample_destination(1, "Paris", "Île-de-France", "France"),
            sample_destination(2, "Lyon", "Auvergne-Rhône-Alpes", "France"),
            sample_destination(3, "Nice", "Provence-Alpes-Côte d'Azur", "France"),
            sample_destination(4, "Rome", "Lazio", "Italy"),
            sample_destination(5, "Milan", "Lombardy", "Italy"),
        ])))
    }

    fn by_country(country: &str) -> SearchCriteria {
        SearchCriteria {
            country: Some(country.to_string()),
            ..Default::default()
        }
    }

    fn names(found: &[Destination]) -> Vec<&str> {
        found.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_search_requires_a_criterion() {
        let result = usecase().search(&SearchCriteria::default(), None);
        assert!(matches!(result, Err(UsecaseError::Validation(_))));

        let blank = SearchCriteria {
            name: Some(String::new()),
            region: Some(String::new()),
            country: None,
        };
        assert!(matches!(usecase().search(&blank, None), Err(UsecaseError::Validation(_))));
    }

    #[test]
    fn test_search_reports_missing_criterion_before_bad_limit() {
        for raw in ["0", "abc"] {
            match usecase().search(&SearchCriteria::default(), Some(raw)) {
                Err(UsecaseError::Validation(msg)) => {
                    assert!(msg.starts_with("At least one search criterion"), "{msg}")
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_search_blank_limit_uses_default() {
        let found = usecase().search(&by_country("France"), Some("")).unwrap();
        assert_eq!(names(&found), vec!["Paris", "Lyon", "Nice"]);
    }

    #[test]
    fn test_search_rejects_zero_limit() {
        let result = usecase().search(&by_country("France"), Some("0"));
        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[test]
    fn test_search_by_country_keeps_catalog_order() {
        let found = usecase().search(&by_country("france"), None).unwrap();
        assert_eq!(names(&found), vec!["Paris", "Lyon", "Nice"]);
    }

    #[test]
    fn test_search_truncates_to_limit() {
        let found = usecase().search(&by_country("France"), Some("2")).unwrap();
        assert_eq!(names(&found), vec!["Paris", "Lyon"]);
    }

    #[test]
    fn test_search_fields_are_combined_with_and() {
        let criteria = SearchCriteria {
            name: Some("Rome".to_string()),
            country: Some("France".to_string()),
            ..Default::default()
        };
        let result = usecase().search(&criteria, None);
        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }

    #[test]
    fn test_search_tolerates_typos() {
        let criteria = SearchCriteria {
            name: Some("Pariz".to_string()),
            ..Default::default()
        };
        let found = usecase().search(&criteria, Some("1")).unwrap();
        assert_eq!(names(&found), vec!["Paris"]);
    }

    #[test]
    fn test_search_by_accentless_region() {
        let criteria = SearchCriteria {
            region: Some("cote d'azur".to_string()),
            ..Default::default()
        };
        let found = usecase().search(&criteria, None).unwrap();
        assert_eq!(names(&found), vec!["Nice"]);
    }

    #[test]
    fn test_search_on_unloaded_catalog_is_unavailable() {
        let usecase = DestinationsUseCase::new(Arc::new(Catalog::default()));
        let result = usecase.search(&by_country("France"), None);
        assert!(matches!(result, Err(UsecaseError::Unavailable(_))));
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_SEARCH_LIMIT);
        assert_eq!(parse_limit(Some("3")).unwrap(), 3);
        assert_eq!(parse_limit(Some("")).unwrap(), DEFAULT_SEARCH_LIMIT);
        assert_eq!(parse_limit(Some("  ")).unwrap(), DEFAULT_SEARCH_LIMIT);
        assert!(parse_limit(Some("0")).is_err());
        assert!(parse_limit(Some("-2")).is_err());
        assert!(parse_limit(Some("many")).is_err());
    }

    #[test]
    fn test_get_validates_range() {
        let usecase = usecase();

        assert_eq!(usecase.get(4).unwrap().name, "Rome");
        assert!(matches!(usecase.get(0), Err(UsecaseError::Validation(_))));
        assert!(matches!(usecase.get(6), Err(UsecaseError::Validation(_))));
    }

    #[test]
    fn test_coordinates() {
        let usecase = usecase();
        let coordinates = usecase.coordinates(1).unwrap();
        assert_eq!(coordinates.latitude, 48.8566);
    }

    #[test]
    fn test_countries() {
        assert_eq!(usecase().countries().unwrap(), vec!["France", "Italy"]);
    }
}
