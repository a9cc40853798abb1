//! Storage infrastructure - database connectivity and schema

pub mod migrations;
mod postgres;

pub use migrations::{run_user_migrations, Migration, PostgresMigrator};
pub use postgres::{connect, PostgresConfig};
