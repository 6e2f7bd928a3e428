//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod fabriken;
pub mod pool;
pub mod produkte;
pub mod refresh_tokens;
pub mod standorte;
pub mod users;

pub use pool::SqliteDb;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::DbResult;

/// Zeitstempel als RFC 3339 mit fester Mikrosekunden-Genauigkeit und `Z`.
///
/// Das feste Format macht den lexikografischen Vergleich in SQL gleich
/// dem chronologischen.
pub(crate) fn zeit_text(zeit: DateTime<Utc>) -> String {
    zeit.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn zeit_parsen(spalte: &str, wert: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige {spalte} '{wert}': {e}")))
}

pub(crate) fn datum_parsen(spalte: &str, wert: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(wert, "%Y-%m-%d")
        .map_err(|e| DbError::intern(format!("Ungueltiges {spalte} '{wert}': {e}")))
}

pub(crate) fn uuid_parsen(spalte: &str, wert: &str) -> DbResult<Uuid> {
    Uuid::parse_str(wert)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID in {spalte} '{wert}': {e}")))
}
