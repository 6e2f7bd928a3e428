//! HTTP- und WebSocket-Schnittstelle des Katalog-Servers

pub mod auth;
pub mod cookies;
pub mod fehler;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use katalog_auth::AuthService;
use katalog_core::{Ereignis, Namespace};
use katalog_db::SqliteDb;
use katalog_observability::{HealthQuelle, KatalogMetriken};
use katalog_realtime::Hub;

pub use fehler::ApiFehler;

/// Auth-Service ueber dem SQLite-Backend
pub type KatalogAuth = AuthService<SqliteDb, SqliteDb>;

/// Axum-State fuer alle Katalog-Routen
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqliteDb>,
    pub auth: Arc<KatalogAuth>,
    pub hub: Hub,
    pub metriken: KatalogMetriken,
    /// `Secure`-Flag am Refresh-Cookie
    pub cookie_secure: bool,
}

impl AppState {
    pub fn neu(
        db: Arc<SqliteDb>,
        auth: Arc<KatalogAuth>,
        hub: Hub,
        metriken: KatalogMetriken,
        cookie_secure: bool,
    ) -> Self {
        Self {
            db,
            auth,
            hub,
            metriken,
            cookie_secure,
        }
    }

    /// Verteilt ein Domaenen-Ereignis `<namespace>:<verb>` an alle Abonnenten
    pub async fn melden(&self, namespace: Namespace, verb: &str, daten: impl Serialize) {
        let ereignis = Ereignis::domain(namespace, verb, daten);
        tracing::debug!(event = %ereignis.event, "Ereignis wird verteilt");
        self.hub.broadcast(ereignis).await;
    }
}

impl HealthQuelle for AppState {
    async fn db_erreichbar(&self) -> bool {
        self.db.ping().await
    }

    async fn verbindungen(&self) -> usize {
        self.hub.statistik().await.verbindungen
    }
}

/// Erfolgsantwort `{"data": ...}`
pub fn daten_antwort<T: Serialize>(status: StatusCode, daten: T) -> Response {
    (status, Json(json!({ "data": daten }))).into_response()
}
