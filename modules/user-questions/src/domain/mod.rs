pub mod error;
pub mod model;
pub mod plan;
pub mod random;
pub mod repo;
pub mod service;
