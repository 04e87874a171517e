pub mod handlers;
pub mod model;
pub mod repository;
pub mod seed;
pub mod store;
