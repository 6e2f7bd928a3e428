//! Fehlertypen fuer den Auth-Service

use thiserror::Error;

use crate::token::TokenFehler;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Eingabe ---
    #[error("Ungueltige Eingabe: {0}")]
    EingabeUngueltig(String),

    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Authentifizierung ---
    #[error("Konto oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    #[error("Token ungueltig: {0}")]
    Token(TokenFehler),

    #[error("Refresh-Token widerrufen")]
    TokenWiderrufen,

    #[error("Token abgelaufen")]
    TokenAbgelaufen,

    // --- Benutzerverwaltung ---
    #[error("Konto nicht gefunden: {0}")]
    KontoNichtGefunden(String),

    #[error("Zugriff verweigert: {0}")]
    ZugriffVerweigert(String),

    #[error("Konflikt: {0}")]
    Konflikt(String),

    // --- Datenbank ---
    #[error("Speicher nicht verfuegbar: {0}")]
    SpeicherNichtVerfuegbar(#[from] katalog_db::DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn eingabe(msg: impl Into<String>) -> Self {
        Self::EingabeUngueltig(msg.into())
    }

    pub fn verweigert(msg: impl Into<String>) -> Self {
        Self::ZugriffVerweigert(msg.into())
    }

    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Fehler, nach denen sich der Client neu anmelden muss
    pub fn ist_authentifizierung(&self) -> bool {
        matches!(
            self,
            Self::UngueltigeAnmeldedaten
                | Self::Token(_)
                | Self::TokenWiderrufen
                | Self::TokenAbgelaufen
        )
    }
}

impl From<TokenFehler> for AuthError {
    fn from(e: TokenFehler) -> Self {
        match e {
            TokenFehler::Abgelaufen => Self::TokenAbgelaufen,
            TokenFehler::Signieren(msg) => Self::Intern(msg),
            TokenFehler::SchluesselFehlt => Self::Intern("Signaturschluessel fehlt".into()),
            andere => Self::Token(andere),
        }
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_fehler_zuordnung() {
        assert!(matches!(
            AuthError::from(TokenFehler::Abgelaufen),
            AuthError::TokenAbgelaufen
        ));
        assert!(matches!(
            AuthError::from(TokenFehler::Signatur),
            AuthError::Token(TokenFehler::Signatur)
        ));
        assert!(matches!(
            AuthError::from(TokenFehler::Signieren("x".into())),
            AuthError::Intern(_)
        ));
    }

    #[test]
    fn authentifizierungsfehler_erkennen() {
        assert!(AuthError::TokenWiderrufen.ist_authentifizierung());
        assert!(AuthError::UngueltigeAnmeldedaten.ist_authentifizierung());
        assert!(!AuthError::Konflikt("x".into()).ist_authentifizierung());
        assert!(!AuthError::KontoNichtGefunden("x".into()).ist_authentifizierung());
    }
}
