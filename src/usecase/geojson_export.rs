use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};

use crate::domain::destination::Destination;

/// Builds a FeatureCollection of Point features for map display.
///
/// Output shape:
///    { "type": "FeatureCollection", "name": "<list>", "features": [{"type": "Feature", "id": 1, "geometry": {"type": "Point", "coordinates": [lng, lat]}, "properties": {"name": "...", "country": "..."}}]}
///
/// Destinations without coordinates are left out.
pub fn build_feature_collection<'a>(
    list_name: &str,
    destinations: impl IntoIterator<Item = &'a Destination>,
) -> FeatureCollection {
    let features: Vec<Feature> = destinations
        .into_iter()
        .filter_map(|destination| {
            let Some(coords) = destination.coordinates() else {
                tracing::trace!(destination_id = destination.id, "skipping destination without coordinates");
                return None;
            };
            Some(point_feature(destination, coords.longitude, coords.latitude))
        })
        .collect();

    tracing::debug!(list_name, feature_count = features.len(), "built FeatureCollection");

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("name".to_string(), list_name.into());

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

fn point_feature(destination: &Destination, lng: f64, lat: f64) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), destination.name.clone().into());
    properties.insert("region".to_string(), destination.region.clone().into());
    properties.insert("country".to_string(), destination.country.clone().into());
    properties.insert("category".to_string(), destination.category.clone().into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![lng, lat]))),
        id: Some(Id::Number(destination.id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}
