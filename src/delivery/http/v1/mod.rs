pub mod admin;
pub mod destinations;
pub mod list_destinations;
pub mod lists;
pub mod middleware;
pub mod reviews;
pub mod users;
