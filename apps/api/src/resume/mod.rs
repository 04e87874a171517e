pub mod file_stage;
pub mod handlers;
pub mod model;
pub mod repository;
pub mod store;
