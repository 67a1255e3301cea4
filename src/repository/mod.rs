pub mod csv;
pub mod errors;
pub mod postgres;
