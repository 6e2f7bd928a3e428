//! Authentifizierung per Bearer-Token
//!
//! [`Angemeldet`] verlangt einen gueltigen Access-Token, [`Verwalter`]
//! zusaetzlich die Rolle ADMIN oder ROOT.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use katalog_auth::Claims;

use crate::http::{ApiFehler, AppState};

/// Extrahiert den Bearer-Token aus dem Authorization-Header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Token fuer den WebSocket-Handshake: Header oder Query-Parameter
/// `authorization` (mit oder ohne `Bearer `-Praefix)
pub fn ws_token<'a>(headers: &'a HeaderMap, query: Option<&'a str>) -> Option<&'a str> {
    bearer_token(headers).or_else(|| {
        query
            .map(|q| q.strip_prefix("Bearer ").unwrap_or(q).trim())
            .filter(|t| !t.is_empty())
    })
}

/// Angemeldeter Benutzer (geprueftes Access-Token)
#[derive(Debug, Clone)]
pub struct Angemeldet(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for Angemeldet {
    type Rejection = ApiFehler;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiFehler::NichtAngemeldet("Bearer-Token fehlt".into()))?;
        Ok(Self(state.auth.access_pruefen(token)?))
    }
}

/// Angemeldeter Benutzer mit Rolle ADMIN oder ROOT
#[derive(Debug, Clone)]
pub struct Verwalter(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for Verwalter {
    type Rejection = ApiFehler;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Angemeldet(claims) = Angemeldet::from_request_parts(parts, state).await?;
        if !claims.role.ist_verwalter() {
            tracing::warn!(user_id = %claims.sub, rolle = %claims.role, "Verwaltungszugriff abgelehnt");
            return Err(ApiFehler::Verweigert("Nur ADMIN oder ROOT".into()));
        }
        Ok(Self(claims))
    }
}
