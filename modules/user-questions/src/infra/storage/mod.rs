//! `SeaORM` storage for users, settings and questions.

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod seed_repo;

pub use seed_repo::SeaOrmSeedStore;
