use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Destination {
    pub id: u32,
    pub name: String,
    pub region: String,
    pub country: String,
    pub category: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub annual_tourists: String,
    pub currency: String,
    pub majority_religion: String,
    pub famous_foods: String,
    pub language: String,
    pub best_time_to_visit: String,
    pub cost_of_living: String,
    pub safety: String,
    pub cultural_significance: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Destination {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }
}

/// Immutable snapshot of the destination dataset, built once at startup.
///
/// Identifiers are 1-based positions in load order, so lookup by id is an index.
#[derive(Debug, Default)]
pub struct Catalog {
    destinations: Vec<Destination>,
}

impl Catalog {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self { destinations }
    }

    pub fn is_loaded(&self) -> bool {
        !self.destinations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Destination> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.destinations.get(index)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Distinct non-blank countries in first-seen order.
    pub fn countries(&self) -> Vec<&str> {
        let mut countries: Vec<&str> = Vec::new();
        for destination in &self.destinations {
            let country = destination.country.as_str();
            if !country.trim().is_empty() && !countries.contains(&country) {
                countries.push(country);
            }
        }
        countries
    }
}

#[cfg(test)]
pub(crate) fn sample_destination(id: u32, name: &str, region: &str, country: &str) -> Destination {
    Destination {
        id,
        name: name.to_string(),
        region: region.to_string(),
        country: country.to_string(),
        category: "City".to_string(),
        latitude: Some(48.8566),
        longitude: Some(2.3522),
        annual_tourists: "15 million".to_string(),
        currency: "Euro".to_string(),
        majority_religion: "Christianity".to_string(),
        famous_foods: "Croissant".to_string(),
        language: "French".to_string(),
        best_time_to_visit: "Spring".to_string(),
        cost_of_living: "High".to_string(),
        safety: "Generally safe".to_string(),
        cultural_significance: "Art and history".to_string(),
        description: "A city".to_string(),
    }
}
