pub mod contracts;
pub mod destinations;
pub mod error;
pub mod geojson_export;
pub mod jwt;
pub mod lists;
pub mod matching;
pub mod membership;
pub mod reviews;
pub mod users;
