//! # katalog-observability
//!
//! Betriebssicht auf den Katalog-Server: `GET /metrics` (Prometheus),
//! `GET /health`, tracing-Setup und die Mess-Middleware fuer den Router.

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use health::{health_router, HealthQuelle, HealthResponse, HealthStatus};
pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, KatalogMetriken};
pub use middleware::{request_timing_layer, timing_middleware};
