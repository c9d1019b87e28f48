//! Storage infrastructure - repository implementations

mod factory;
mod in_memory;
pub mod migrations;
pub mod postgres;

pub use factory::{Repositories, StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryStore;
pub use migrations::{revert_last_migration, run_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::PostgresConfig;
