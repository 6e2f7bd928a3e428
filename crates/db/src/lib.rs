//! katalog-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern bereit. Die Geschaeftslogik
//! arbeitet ausschliesslich gegen die Traits in [`repository`]; die
//! SQLite-Implementierung liegt in [`sqlite`].

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{
    DatabaseConfig, DbResult, FabrikRepository, ProduktRepository, RefreshTokenRepository,
    StandortRepository, UserRepository,
};
pub use sqlite::SqliteDb;
