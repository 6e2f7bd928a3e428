//! Fehlertyp der HTTP-Schicht und seine JSON-Darstellung

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use katalog_auth::AuthError;
use katalog_db::DbError;

/// Fehler, die ein Handler an den Client zurueckgibt
#[derive(Debug, Error)]
pub enum ApiFehler {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Datenbank(#[from] DbError),

    #[error("Ungueltige Eingabe: {0}")]
    Eingabe(String),

    #[error("Nicht angemeldet: {0}")]
    NichtAngemeldet(String),

    #[error("Zugriff verweigert: {0}")]
    Verweigert(String),

    #[error("Nicht gefunden: {0}")]
    NichtGefunden(String),
}

impl ApiFehler {
    pub fn eingabe(msg: impl Into<String>) -> Self {
        Self::Eingabe(msg.into())
    }

    pub fn nicht_gefunden(msg: impl Into<String>) -> Self {
        Self::NichtGefunden(msg.into())
    }

    /// HTTP-Statuscode zum Fehler
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(e) => match e {
                AuthError::EingabeUngueltig(_) => StatusCode::BAD_REQUEST,
                AuthError::UngueltigeAnmeldedaten
                | AuthError::Token(_)
                | AuthError::TokenWiderrufen
                | AuthError::TokenAbgelaufen => StatusCode::UNAUTHORIZED,
                AuthError::KontoNichtGefunden(_) => StatusCode::NOT_FOUND,
                AuthError::ZugriffVerweigert(_) => StatusCode::FORBIDDEN,
                AuthError::Konflikt(_) => StatusCode::CONFLICT,
                AuthError::SpeicherNichtVerfuegbar(_)
                | AuthError::PasswortHashing(_)
                | AuthError::Intern(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Datenbank(e) => match e {
                DbError::NichtGefunden(_) => StatusCode::NOT_FOUND,
                DbError::Eindeutigkeit(_) => StatusCode::CONFLICT,
                DbError::UngueltigeDaten(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Eingabe(_) => StatusCode::BAD_REQUEST,
            Self::NichtAngemeldet(_) => StatusCode::UNAUTHORIZED,
            Self::Verweigert(_) => StatusCode::FORBIDDEN,
            Self::NichtGefunden(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiFehler {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // Details nur ins Log, nicht an den Client
            tracing::error!(fehler = %self, "Anfrage fehlgeschlagen");
            return fehler_antwort(status, "Interner Serverfehler");
        }
        tracing::debug!(status = status.as_u16(), fehler = %self, "Anfrage abgelehnt");
        fehler_antwort(status, &self.to_string())
    }
}

/// Fehlerantwort `{"error": {"code", "message"}}`
pub fn fehler_antwort(status: StatusCode, nachricht: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": nachricht
            }
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use katalog_auth::TokenFehler;

    #[test]
    fn auth_fehler_zuordnung() {
        let faelle = [
            (AuthError::eingabe("x"), StatusCode::BAD_REQUEST),
            (AuthError::UngueltigeAnmeldedaten, StatusCode::UNAUTHORIZED),
            (AuthError::Token(TokenFehler::Signatur), StatusCode::UNAUTHORIZED),
            (AuthError::TokenWiderrufen, StatusCode::UNAUTHORIZED),
            (AuthError::TokenAbgelaufen, StatusCode::UNAUTHORIZED),
            (AuthError::KontoNichtGefunden("a".into()), StatusCode::NOT_FOUND),
            (AuthError::verweigert("x"), StatusCode::FORBIDDEN),
            (AuthError::Konflikt("x".into()), StatusCode::CONFLICT),
            (
                AuthError::SpeicherNichtVerfuegbar(DbError::intern("weg")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (fehler, erwartet) in faelle {
            assert_eq!(ApiFehler::from(fehler).status(), erwartet);
        }
    }

    #[test]
    fn db_fehler_zuordnung() {
        assert_eq!(
            ApiFehler::from(DbError::nicht_gefunden("standort")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiFehler::from(DbError::Eindeutigkeit("account".into())).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn interner_fehler_ohne_details() {
        let antwort = ApiFehler::from(DbError::intern("SQLITE_BUSY")).into_response();
        assert_eq!(antwort.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
