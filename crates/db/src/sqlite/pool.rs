//! SQLite-Verbindungspool
//!
//! Dateibasierte Datenbanken laufen wahlweise im WAL-Modus. In-Memory-URLs
//! (`sqlite::memory:`) bekommen genau eine dauerhafte Verbindung, da jede
//! weitere Verbindung eine eigene, leere Datenbank saehe.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::DbError;
use crate::repository::DatabaseConfig;

/// Wartezeit auf eine gesperrte Datenbank, bevor SQLITE_BUSY gemeldet wird
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Katalog-Datenbank auf SQLite; implementiert alle Repository-Traits
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
}

impl SqliteDb {
    /// Oeffnet (oder erzeugt) die Datenbank und bringt das Schema auf Stand
    pub async fn oeffnen(config: &DatabaseConfig) -> Result<Self, DbError> {
        let im_speicher = ist_in_memory(&config.url);
        let journal = if config.sqlite_wal && !im_speicher {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        };

        let opts = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(journal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = if im_speicher {
            Self::einzelverbindung(opts).await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_verbindungen.max(1))
                .acquire_timeout(BUSY_TIMEOUT)
                .connect_with(opts)
                .await?
        };

        info!(
            url = %config.url,
            journal = ?journal,
            max_verbindungen = config.max_verbindungen,
            "SQLite-Pool geoeffnet"
        );

        let db = Self { pool };
        db.migrationen_ausfuehren().await?;
        Ok(db)
    }

    /// Leere In-Memory-Datenbank mit aktuellem Schema (Tests)
    pub async fn in_memory() -> Result<Self, DbError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let db = Self {
            pool: Self::einzelverbindung(opts).await?,
        };
        db.migrationen_ausfuehren().await?;
        Ok(db)
    }

    async fn einzelverbindung(opts: SqliteConnectOptions) -> Result<SqlitePool, DbError> {
        // Die Verbindung darf nie geschlossen werden, sonst ist der Inhalt weg
        Ok(SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?)
    }

    /// Wendet alle Migrationen aus `migrations/` an
    pub async fn migrationen_ausfuehren(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("Schema aktuell");
        Ok(())
    }

    /// `SELECT 1` – fuer den Health-Check
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Schliesst alle Verbindungen; laufende Abfragen duerfen noch enden
    pub async fn schliessen(&self) {
        self.pool.close().await;
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn ist_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
