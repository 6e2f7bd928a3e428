//! HTTP-Messung
//!
//! `timing_middleware` laeuft als `route_layer`, sieht also nur Anfragen auf
//! bekannte Routen und bekommt dort das Routenmuster als `MatchedPath`.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, Response},
    middleware::Next,
};
use std::time::Instant;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;

use crate::metrics::KatalogMetriken;

/// Span pro Anfrage (tower-http), aeusserster Layer des Routers
pub fn request_timing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Zaehlt und misst jede Anfrage nach Methode, Routenmuster und Status
pub async fn timing_middleware(
    State(metriken): State<KatalogMetriken>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let methode = req.method().clone();
    let route = match req.extensions().get::<MatchedPath>() {
        Some(muster) => muster.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };

    let start = Instant::now();
    let response = next.run(req).await;
    let dauer = start.elapsed();

    let status = response.status();
    let labels = [methode.as_str(), route.as_str()];
    metriken
        .http_requests_total
        .with_label_values(&[labels[0], labels[1], status.as_str()])
        .inc();
    metriken
        .http_request_duration_seconds
        .with_label_values(&labels)
        .observe(dauer.as_secs_f64());

    let ms = dauer.as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(%methode, %route, status = status.as_u16(), ms, "Anfrage fehlgeschlagen");
    } else {
        tracing::debug!(%methode, %route, status = status.as_u16(), ms, "Anfrage beantwortet");
    }

    response
}
