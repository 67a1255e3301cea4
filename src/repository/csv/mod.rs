use std::{fs::File, io::Read, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::destination::{Catalog, Destination};

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to open catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog data: {0}")]
    Malformed(#[from] csv::Error),
    #[error("catalog has too many rows")]
    TooManyRows,
}

/// One row of the destinations dataset, keyed by the dataset's own column headers.
#[derive(Debug, Deserialize)]
struct DestinationRecord {
    #[serde(rename = "Destination", default)]
    name: String,
    #[serde(rename = "Region", default)]
    region: String,
    #[serde(rename = "Country", default)]
    country: String,
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "Latitude", default)]
    latitude: String,
    #[serde(rename = "Longitude", default)]
    longitude: String,
    #[serde(rename = "Approximate Annual Tourists", default)]
    annual_tourists: String,
    #[serde(rename = "Currency", default)]
    currency: String,
    #[serde(rename = "Majority Religion", default)]
    majority_religion: String,
    #[serde(rename = "Famous Foods", default)]
    famous_foods: String,
    #[serde(rename = "Language", default)]
    language: String,
    #[serde(rename = "Best Time to Visit", default)]
    best_time_to_visit: String,
    #[serde(rename = "Cost of Living", default)]
    cost_of_living: String,
    #[serde(rename = "Safety", default)]
    safety: String,
    #[serde(rename = "Cultural Significance", default)]
    cultural_significance: String,
    #[serde(rename = "Description", default)]
    description: String,
}

impl DestinationRecord {
    fn into_destination(self, id: u32) -> Destination {
        Destination {
            id,
            name: self.name,
            region: self.region,
            country: self.country,
            category: self.category,
            latitude: parse_coordinate(&self.latitude),
            longitude: parse_coordinate(&self.longitude),
            annual_tourists: self.annual_tourists,
            currency: self.currency,
            majority_religion: self.majority_religion,
            famous_foods: self.famous_foods,
            language: self.language,
            best_time_to_visit: self.best_time_to_visit,
            cost_of_living: self.cost_of_living,
            safety: self.safety,
            cultural_significance: self.cultural_significance,
            description: self.description,
        }
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogLoadError> {
    tracing::debug!("loading destination catalog");

    let file = File::open(path)?;
    let catalog = load_catalog_from_reader(file)?;

    tracing::info!(count = catalog.len(), "destination catalog loaded");
    Ok(catalog)
}

/// Reads every row in order, assigning ids 1, 2, 3, ...
pub fn load_catalog_from_reader<R: Read>(reader: R) -> Result<Catalog, CatalogLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let mut destinations = Vec::new();
    for (index, row) in csv_reader.deserialize::<DestinationRecord>().enumerate() {
        let record = row?;
        let id = u32::try_from(index + 1).map_err(|_| CatalogLoadError::TooManyRows)?;
        tracing::trace!(id, name = %record.name, "loaded destination");
        destinations.push(record.into_destination(id));
    }

    Ok(Catalog::new(destinations))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
 Destination ,Region,Country,Category,Latitude,Longitude,Approximate Annual Tourists,Currency,Majority Religion,Famous Foods,Language,Best Time to Visit,Cost of Living,Safety,Cultural Significance,Description
Paris,Île-de-France,France,City,48.8566,2.3522,15 million,Euro,Christianity,\"Croissant, Baguette\",French,Spring,High,Generally safe,Art,The capital of France
Rome,Lazio,Italy,City,41.9028,12.4964,10 million,Euro,Christianity,Pizza,Italian,Spring,High,Generally safe,History,The Eternal City
Atlantis,Ocean,Nowhere,Myth,,n/a,0,None,None,None,None,Never,None,Unknown,None,Lost
";

    #[test]
    fn test_assigns_one_based_ids_in_order() {
        let catalog = load_catalog_from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 3);
        let names: Vec<(u32, &str)> = catalog.iter().map(|d| (d.id, d.name.as_str())).collect();
        assert_eq!(names, vec![(1, "Paris"), (2, "Rome"), (3, "Atlantis")]);
    }

    #[test]
    fn test_trims_headers_and_keeps_quoted_fields() {
        let catalog = load_catalog_from_reader(SAMPLE.as_bytes()).unwrap();
        let paris = catalog.get(1).unwrap();

        assert_eq!(paris.name, "Paris");
        assert_eq!(paris.famous_foods, "Croissant, Baguette");
        assert_eq!(paris.annual_tourists, "15 million");
        assert_eq!(paris.latitude, Some(48.8566));
    }

    #[test]
    fn test_unparsable_coordinates_are_absent() {
        let catalog = load_catalog_from_reader(SAMPLE.as_bytes()).unwrap();
        let atlantis = catalog.get(3).unwrap();

        assert_eq!(atlantis.latitude, None);
        assert_eq!(atlantis.longitude, None);
        assert!(atlantis.coordinates().is_none());
    }

    #[test]
    fn test_header_only_file_is_empty_catalog() {
        let catalog = load_catalog_from_reader("Destination,Region,Country\n".as_bytes()).unwrap();
        assert!(!catalog.is_loaded());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_catalog(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(CatalogLoadError::Io(_))));
    }
}
