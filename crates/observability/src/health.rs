//! Health-Check-Endpunkt fuer Katalog
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime, DB-Erreichbarkeit und
//! Anzahl registrierter WebSocket-Verbindungen

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub db_connected: bool,
    pub verbindungen: usize,
}

/// Quelle der Laufzeitdaten fuer den Health-Check
pub trait HealthQuelle: Send + Sync + 'static {
    /// `SELECT 1` gegen die Datenbank
    fn db_erreichbar(&self) -> impl Future<Output = bool> + Send;

    fn verbindungen(&self) -> impl Future<Output = usize> + Send;
}

/// Geteilter Zustand fuer den Health-Check-Handler
pub struct HealthState<Q> {
    start_time: Instant,
    quelle: Q,
}

impl<Q: HealthQuelle> HealthState<Q> {
    pub fn neu(quelle: Q) -> Self {
        Self {
            start_time: Instant::now(),
            quelle,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Erstellt die aktuelle Antwort
    pub async fn pruefen(&self) -> HealthResponse {
        let db_connected = self.quelle.db_erreichbar().await;
        let verbindungen = self.quelle.verbindungen().await;

        HealthResponse {
            status: if db_connected {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            db_connected,
            verbindungen,
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router<Q: HealthQuelle>(quelle: Q) -> Router {
    Router::new()
        .route("/health", get(health_handler::<Q>))
        .with_state(Arc::new(HealthState::neu(quelle)))
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler<Q: HealthQuelle>(
    State(state): State<Arc<HealthState<Q>>>,
) -> impl IntoResponse {
    // 200 auch bei degraded (Probe soll nicht failen)
    (StatusCode::OK, Json(state.pruefen().await))
}
