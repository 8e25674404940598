//! Database migrations for rentfeed.
//!
//! All schema changes go through SeaORM Migration so the same history runs
//! on Postgres and on the in-memory SQLite databases used in tests.

pub use sea_orm_migration::prelude::*;

mod m2026_07_01_000001_create_listings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m2026_07_01_000001_create_listings::Migration)]
    }
}
