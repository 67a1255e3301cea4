pub mod destination;
pub mod list;
pub mod review;
pub mod user;
