//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `RUST_LOG`: vollstaendiger Filter, hat Vorrang vor allem anderen
//! - `KATALOG_LOG_LEVEL`: Log-Level (trace/debug/info/warn/error)
//! - `KATALOG_LOG_FORMAT`: Format (text/json)
//!
//! Ohne Umgebungsvariablen gelten die Werte aus der Konfigurationsdatei.

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "KATALOG_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "KATALOG_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// `level` und `format` stammen aus der Konfiguration und werden von den
/// Umgebungsvariablen ueberschrieben.
pub fn logging_initialisieren(level: &str, format: &str) {
    let level = log_level_aus_env().unwrap_or_else(|| level.to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = log_format_aus_env().unwrap_or_else(|| format.to_string());

    match format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Log-Level aus `KATALOG_LOG_LEVEL`, falls gesetzt und gueltig
pub fn log_level_aus_env() -> Option<String> {
    std::env::var(ENV_LOG_LEVEL)
        .ok()
        .filter(|l| log_level_gueltig(l))
}

/// Log-Format aus `KATALOG_LOG_FORMAT`, falls gesetzt und gueltig
pub fn log_format_aus_env() -> Option<String> {
    std::env::var(ENV_LOG_FORMAT)
        .ok()
        .filter(|f| log_format_gueltig(f))
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
