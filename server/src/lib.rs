//! katalog-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod http;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

use config::ServerConfig;
use katalog_auth::{bereinigung_starten, AuthService, TokenCodec};
use katalog_db::SqliteDb;
use katalog_observability::KatalogMetriken;
use katalog_realtime::Hub;

pub use http::{routes::app_router, AppState};

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen und migrieren
    /// 2. Token-Codec, Auth-Service, Metriken und Hub aufbauen
    /// 3. Bereinigungs-Task starten
    /// 4. HTTP/WebSocket-Server starten
    /// 5. Auf Ctrl-C / SIGTERM warten, dann geordnet herunterfahren
    pub async fn starten(self) -> Result<()> {
        self.starten_mit_signal(shutdown_signal()).await
    }

    /// Wie [`Server::starten`], mit frei waehlbarem Shutdown-Signal
    pub async fn starten_mit_signal(
        self,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let config = &self.config;
        config.pruefen()?;

        tracing::info!(url = %config.datenbank.url, "Datenbankverbindung wird hergestellt");
        let db = Arc::new(SqliteDb::oeffnen(&config.datenbank_konfig()).await?);

        let codec = TokenCodec::neu(config.auth.jwt_schluessel.as_bytes())?;
        let auth = Arc::new(AuthService::neu(
            db.clone(),
            db.clone(),
            Arc::new(codec),
            config.auth_konfig(),
        ));

        let metriken = KatalogMetriken::neu()?;
        let (hub, hub_task) = Hub::starten(config.hub_konfig(), metriken.clone());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let bereinigung =
            bereinigung_starten(db.clone(), config.bereinigung_intervall(), shutdown_rx);

        let db_handle = db.clone();
        let state = AppState::neu(db, auth, hub.clone(), metriken, config.auth.cookie_secure);
        let app = app_router(state, &config.cors.erlaubte_origins);

        let listener = tokio::net::TcpListener::bind(config.bind_adresse()).await?;
        tracing::info!(adresse = %config.bind_adresse(), "Katalog-Server gestartet");

        // Der HTTP-Server wartet auf das interne Signal, nicht direkt auf Ctrl-C:
        // Hub und Bereinigung muessen vor dem Drain beendet werden.
        let (http_stop_tx, mut http_stop_rx) = watch::channel(false);
        let mut http_task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = http_stop_rx.changed().await;
                })
                .await
        });

        tokio::select! {
            _ = signal => {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
            }
            ergebnis = &mut http_task => {
                // Server ist ohne Signal beendet worden
                hub.herunterfahren().await;
                let _ = shutdown_tx.send(true);
                return match ergebnis {
                    Ok(r) => r.map_err(Into::into),
                    Err(e) => Err(anyhow::anyhow!("HTTP-Task abgebrochen: {e}")),
                };
            }
        }

        hub.herunterfahren().await;
        let _ = shutdown_tx.send(true);
        let _ = http_stop_tx.send(true);

        let abschluss = async {
            let _ = hub_task.await;
            let _ = bereinigung.await;
            http_task.await
        };
        match tokio::time::timeout(config.shutdown_timeout(), abschluss).await {
            Ok(Ok(Ok(()))) => tracing::info!("Server sauber beendet"),
            Ok(Ok(Err(e))) => tracing::error!(fehler = %e, "HTTP-Server mit Fehler beendet"),
            Ok(Err(e)) => tracing::error!(fehler = %e, "HTTP-Task abgebrochen"),
            Err(_) => tracing::warn!(
                timeout_sek = config.server.shutdown_timeout_sek,
                "Shutdown-Timeout erreicht, offene Verbindungen werden verworfen"
            ),
        }
        db_handle.schliessen().await;
        Ok(())
    }
}

/// Wartet auf Ctrl-C oder (unter Unix) SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(fehler = %e, "Ctrl-C-Handler nicht installierbar");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(fehler = %e, "SIGTERM-Handler nicht installierbar");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = sigterm => {},
    }
}
