//! katalog-server
//!
//! Aufruf: `katalog-server [pfad/zur/config.toml]`. Ohne Argument gilt
//! `KATALOG_CONFIG`, danach `config.toml` im Arbeitsverzeichnis.

use std::path::Path;

use katalog_observability::logging_initialisieren;
use katalog_server::{config::ServerConfig, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let pfad = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("KATALOG_CONFIG").ok())
        .unwrap_or_else(|| "config.toml".to_owned());

    let config = ServerConfig::laden(&pfad)?;
    logging_initialisieren(&config.logging.level, &config.logging.format);

    if !Path::new(&pfad).exists() {
        tracing::warn!(config = %pfad, "keine Konfigurationsdatei, Standardwerte aktiv");
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %pfad,
        bind = %config.bind_adresse(),
        "katalog-server startet"
    );

    Server::neu(config).starten().await
}
