pub mod config;
pub mod database;
pub mod postgres;
pub mod sqlite;

mod sql;

pub use config::Config;
pub use database::{connect, Backend};
pub use postgres::PgCatalog;
pub use sqlite::SqliteCatalog;
