//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Alle Methoden liefern `Send`-Futures, damit
//! sie direkt aus axum-Handlern und tokio-Tasks aufgerufen werden koennen.
//! Ein Abbruch erfolgt durch Verwerfen des Futures.

use std::future::Future;

use katalog_core::{FabrikId, ProduktId, StandortId, UserId};

use crate::error::DbError;
use crate::models::{
    BenutzerRecord, BenutzerUpdate, FabrikRecord, FabrikUpdate, NeueFabrik, NeuerBenutzer,
    NeuerRefreshToken, NeuesProdukt, ProduktRecord, ProduktUpdate, RefreshTokenRecord,
    StandortRecord,
};

/// Result-Alias fuer Datenbankoperationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://katalog.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://katalog.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Repository fuer Benutzerkonten
pub trait UserRepository: Send + Sync {
    fn create(
        &self,
        data: NeuerBenutzer<'_>,
    ) -> impl Future<Output = DbResult<BenutzerRecord>> + Send;

    fn get_by_id(&self, id: UserId)
        -> impl Future<Output = DbResult<Option<BenutzerRecord>>> + Send;

    /// Laedt einen Benutzer anhand seiner Kontokennung (E-Mail)
    fn get_by_account(
        &self,
        account: &str,
    ) -> impl Future<Output = DbResult<Option<BenutzerRecord>>> + Send;

    /// Aktualisiert nur die gesetzten Felder
    fn update(
        &self,
        id: UserId,
        data: BenutzerUpdate,
    ) -> impl Future<Output = DbResult<BenutzerRecord>> + Send;

    /// Loescht den Benutzer samt seiner Refresh-Tokens
    fn delete(&self, id: UserId) -> impl Future<Output = DbResult<bool>> + Send;

    fn list(&self) -> impl Future<Output = DbResult<Vec<BenutzerRecord>>> + Send;
}

// ---------------------------------------------------------------------------
// Refresh-Tokens (Credential Store)
// ---------------------------------------------------------------------------

/// Persistenz fuer Refresh-Tokens
///
/// Der Token-String selbst ist der Schluessel. Wird derselbe Token erneut
/// gespeichert, wird der vorhandene Datensatz reaktiviert.
pub trait RefreshTokenRepository: Send + Sync {
    fn create(
        &self,
        data: NeuerRefreshToken<'_>,
    ) -> impl Future<Output = DbResult<RefreshTokenRecord>> + Send;

    /// Laedt einen Datensatz unabhaengig von Widerruf und Ablauf
    fn get_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = DbResult<Option<RefreshTokenRecord>>> + Send;

    /// Loescht den Datensatz; `true` wenn eine Zeile entfernt wurde
    fn delete_by_token(&self, token: &str) -> impl Future<Output = DbResult<bool>> + Send;

    /// Widerruft alle aktiven Tokens eines Benutzers; liefert die Anzahl
    fn revoke_by_user(&self, user_id: UserId) -> impl Future<Output = DbResult<u64>> + Send;

    /// Loescht alle Tokens, die widerrufen UND abgelaufen sind
    fn cleanup_revoked_expired(&self) -> impl Future<Output = DbResult<u64>> + Send;

    /// Widerruft alle Tokens des Benutzers und speichert den neuen Token
    /// in einer einzigen Transaktion
    fn ersetzen_fuer_benutzer(
        &self,
        data: NeuerRefreshToken<'_>,
    ) -> impl Future<Output = DbResult<RefreshTokenRecord>> + Send;
}

// ---------------------------------------------------------------------------
// Katalog
// ---------------------------------------------------------------------------

/// Repository fuer Standorte
pub trait StandortRepository: Send + Sync {
    fn create(&self, name_local: &str) -> impl Future<Output = DbResult<StandortRecord>> + Send;

    fn get_by_id(
        &self,
        id: StandortId,
    ) -> impl Future<Output = DbResult<Option<StandortRecord>>> + Send;

    fn update(
        &self,
        id: StandortId,
        name_local: &str,
    ) -> impl Future<Output = DbResult<StandortRecord>> + Send;

    fn delete(&self, id: StandortId) -> impl Future<Output = DbResult<bool>> + Send;

    fn list(&self) -> impl Future<Output = DbResult<Vec<StandortRecord>>> + Send;
}

/// Repository fuer Fabriken
pub trait FabrikRepository: Send + Sync {
    fn create(&self, data: NeueFabrik<'_>) -> impl Future<Output = DbResult<FabrikRecord>> + Send;

    fn get_by_id(&self, id: FabrikId)
        -> impl Future<Output = DbResult<Option<FabrikRecord>>> + Send;

    fn update(
        &self,
        id: FabrikId,
        data: FabrikUpdate,
    ) -> impl Future<Output = DbResult<FabrikRecord>> + Send;

    fn delete(&self, id: FabrikId) -> impl Future<Output = DbResult<bool>> + Send;

    fn list(&self) -> impl Future<Output = DbResult<Vec<FabrikRecord>>> + Send;

    fn list_by_standort(
        &self,
        location_id: StandortId,
    ) -> impl Future<Output = DbResult<Vec<FabrikRecord>>> + Send;
}

/// Repository fuer Produkte
pub trait ProduktRepository: Send + Sync {
    fn create(
        &self,
        data: NeuesProdukt<'_>,
    ) -> impl Future<Output = DbResult<ProduktRecord>> + Send;

    fn get_by_id(
        &self,
        id: ProduktId,
    ) -> impl Future<Output = DbResult<Option<ProduktRecord>>> + Send;

    fn update(
        &self,
        id: ProduktId,
        data: ProduktUpdate,
    ) -> impl Future<Output = DbResult<ProduktRecord>> + Send;

    fn delete(&self, id: ProduktId) -> impl Future<Output = DbResult<bool>> + Send;

    fn list(&self) -> impl Future<Output = DbResult<Vec<ProduktRecord>>> + Send;

    fn list_by_fabrik(
        &self,
        factory_id: FabrikId,
    ) -> impl Future<Output = DbResult<Vec<ProduktRecord>>> + Send;
}
