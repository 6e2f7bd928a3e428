//! Prometheus-kompatible Metriken fuer Katalog
//!
//! Registrierte Metriken:
//! - `katalog_ws_verbindungen` – Gauge: Aktuell registrierte WebSocket-Verbindungen
//! - `katalog_broadcasts_total` – Counter: Verteilte Domaenen-Ereignisse
//! - `katalog_zustellungen_total` – Counter: Einzelzustellungen an Verbindungen
//! - `katalog_verbindungen_verworfen_total` – Counter: Wegen voller Queue getrennte Verbindungen
//! - `katalog_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `katalog_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit
//!
//! Keine globale Registry: Hub und Router bekommen dieselbe Instanz
//! uebergeben, Tests bauen sich jeweils eine eigene.

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Alle Katalog-Prometheus-Metriken
#[derive(Clone)]
pub struct KatalogMetriken {
    pub registry: Arc<Registry>,

    // Echtzeit-Metriken
    pub ws_verbindungen: IntGauge,
    pub broadcasts_total: IntCounter,
    pub zustellungen_total: IntCounter,
    pub verbindungen_verworfen_total: IntCounter,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

/// Registriert einen Collector und gibt einen Klon fuer den Aufrufer zurueck
fn registriert<C>(registry: &Registry, collector: C) -> prometheus::Result<C>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

impl KatalogMetriken {
    /// Legt eine eigene Registry an; mehrere Instanzen stoeren sich nicht
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();
        let zaehler = |name: &str, hilfe: &str| {
            registriert(&registry, IntCounter::with_opts(Opts::new(name, hilfe))?)
        };

        let ws_verbindungen = registriert(
            &registry,
            IntGauge::new("katalog_ws_verbindungen", "Registrierte WebSocket-Verbindungen")?,
        )?;
        let broadcasts_total = zaehler(
            "katalog_broadcasts_total",
            "Verteilte Domaenen-Ereignisse",
        )?;
        let zustellungen_total = zaehler(
            "katalog_zustellungen_total",
            "In Verbindungs-Queues eingereihte Nachrichten",
        )?;
        let verbindungen_verworfen_total = zaehler(
            "katalog_verbindungen_verworfen_total",
            "Wegen voller oder geschlossener Queue getrennte Verbindungen",
        )?;

        let http_requests_total = registriert(
            &registry,
            IntCounterVec::new(
                Opts::new("katalog_http_requests_total", "HTTP-Anfragen nach Route und Status"),
                &["method", "path", "status"],
            )?,
        )?;
        let http_request_duration_seconds = registriert(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "katalog_http_request_duration_seconds",
                    "Bearbeitungsdauer einer HTTP-Anfrage",
                )
                .buckets(prometheus::exponential_buckets(0.001, 2.5, 10)?),
                &["method", "path"],
            )?,
        )?;

        Ok(Self {
            registry: Arc::new(registry),
            ws_verbindungen,
            broadcasts_total,
            zustellungen_total,
            verbindungen_verworfen_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Textformat 0.0.4 fuer den Prometheus-Scraper
    pub fn exportieren(&self) -> Result<String> {
        let mut puffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut puffer)?;
        Ok(String::from_utf8(puffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: KatalogMetriken) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<KatalogMetriken>) -> Response {
    metriken
        .exportieren()
        .map(|text| {
            ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response()
        })
        .unwrap_or_else(|fehler| {
            tracing::error!(%fehler, "Metriken-Export fehlgeschlagen");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}
