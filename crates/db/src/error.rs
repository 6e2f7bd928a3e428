//! Fehler der Persistenzschicht

use thiserror::Error;

/// Alles, was beim Lesen oder Schreiben des Katalogs schiefgehen kann
///
/// Die ersten drei Varianten sind fachlich (404/409/400 an der HTTP-Grenze),
/// der Rest gilt als Betriebsfehler.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("nicht gefunden: {0}")]
    NichtGefunden(String),

    /// Verletzter UNIQUE-Index (z.B. `users.account`)
    #[error("bereits vorhanden: {0}")]
    Eindeutigkeit(String),

    /// Fremdschluessel zeigt ins Leere oder Wert ist nicht zulaessig
    #[error("ungueltige Eingabe: {0}")]
    UngueltigeDaten(String),

    #[error("Datenbankzugriff fehlgeschlagen: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Schema-Migration fehlgeschlagen: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("inkonsistenter Datenbestand: {0}")]
    Intern(String),
}

impl DbError {
    pub fn nicht_gefunden(was: impl Into<String>) -> Self {
        Self::NichtGefunden(was.into())
    }

    pub fn intern(was: impl Into<String>) -> Self {
        Self::Intern(was.into())
    }

    /// Uebersetzt Constraint-Verletzungen beim Schreiben
    pub(crate) fn aus_schreibfehler(e: sqlx::Error, kontext: impl Into<String>) -> Self {
        let Some(db) = e.as_database_error() else {
            return Self::Sqlx(e);
        };
        if db.is_unique_violation() {
            Self::Eindeutigkeit(kontext.into())
        } else if db.is_foreign_key_violation() {
            Self::UngueltigeDaten(format!("{}: Referenz existiert nicht", kontext.into()))
        } else {
            Self::Sqlx(e)
        }
    }

    pub fn ist_eindeutigkeit(&self) -> bool {
        matches!(self, Self::Eindeutigkeit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anzeige_enthaelt_kontext() {
        let e = DbError::nicht_gefunden("Standort 42");
        assert_eq!(e.to_string(), "nicht gefunden: Standort 42");
        assert!(DbError::Eindeutigkeit("account".into()).ist_eindeutigkeit());
        assert!(!DbError::intern("x").ist_eindeutigkeit());
    }

    #[test]
    fn fremde_sqlx_fehler_durchreichen() {
        let e = DbError::aus_schreibfehler(sqlx::Error::RowNotFound, "produkt");
        assert!(matches!(e, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
