//! `GET /ws/:namespace` – WebSocket-Zugang zum Echtzeit-Hub
//!
//! Der Access-Token wird vor dem Upgrade geprueft. Ohne gueltigen Token
//! antwortet der Server mit 401 und die Verbindung wird nie registriert.

use axum::{
    extract::{ws::WebSocketUpgrade, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use katalog_core::Namespace;
use katalog_realtime::{sitzung_fuehren, Identitaet};

use crate::http::auth::ws_token;
use crate::http::{ApiFehler, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub authorization: Option<String>,
}

pub async fn verbinden(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    upgrade: Option<WebSocketUpgrade>,
) -> Result<Response, ApiFehler> {
    let namespace: Namespace = namespace
        .parse()
        .map_err(|_| ApiFehler::nicht_gefunden(format!("Namespace /{namespace}")))?;

    let token = ws_token(&headers, query.authorization.as_deref())
        .ok_or_else(|| ApiFehler::NichtAngemeldet("Token fehlt".into()))?;
    let claims = state.auth.access_pruefen(token).map_err(|e| {
        tracing::warn!(namespace = %namespace, fehler = %e, "WebSocket-Handshake abgelehnt");
        ApiFehler::from(e)
    })?;

    let upgrade =
        upgrade.ok_or_else(|| ApiFehler::eingabe("WebSocket-Upgrade erwartet"))?;

    let identitaet = Identitaet {
        user_id: claims.sub,
        rolle: claims.role,
        namespace,
    };
    tracing::info!(user_id = %claims.sub, namespace = %namespace, "WebSocket verbunden");

    let hub = state.hub.clone();
    Ok(upgrade
        .on_upgrade(move |socket| sitzung_fuehren(socket, hub, identitaet))
        .into_response())
}
