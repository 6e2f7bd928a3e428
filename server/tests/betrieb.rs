//! Health, Metriken und Server-Lebenszyklus

mod common;

use std::time::Duration;

use axum::http::StatusCode;

use katalog_server::{config::ServerConfig, Server};

use common::test_app;

#[tokio::test]
async fn health_meldet_datenbank_und_verbindungen() {
    let app = test_app().await;
    let antwort = app.senden("GET", "/health", None, None, None).await;

    assert_eq!(antwort.status, StatusCode::OK);
    assert_eq!(antwort.json["status"], "healthy");
    assert_eq!(antwort.json["db_connected"], true);
    assert_eq!(antwort.json["verbindungen"], 0);
}

#[tokio::test]
async fn metriken_zaehlen_http_anfragen() {
    let app = test_app().await;
    let liste = app.senden("GET", "/katalog/location/list", None, None, None).await;
    assert_eq!(liste.status, StatusCode::OK);

    let metriken = app.senden("GET", "/metrics", None, None, None).await;
    assert_eq!(metriken.status, StatusCode::OK);
    assert_eq!(
        metriken.headers["content-type"],
        "text/plain; version=0.0.4"
    );

    let text = app.state.metriken.exportieren().unwrap();
    assert!(text.contains("katalog_http_requests_total"));
    assert!(text.contains(r#"path="/katalog/location/list""#));
    assert!(text.contains("katalog_ws_verbindungen 0"));
}

#[tokio::test]
async fn server_startet_und_faehrt_auf_signal_herunter() {
    let mut config = ServerConfig::default();
    config.server.bind_adresse = "127.0.0.1".into();
    config.server.port = 0;
    config.datenbank.url = "sqlite::memory:".into();
    config.datenbank.max_verbindungen = 1;
    config.datenbank.sqlite_wal = false;
    config.auth.jwt_schluessel = "lebenszyklus-test".into();

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(Server::neu(config).starten_mit_signal(async move {
        let _ = stop_rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(200)).await;
    stop_tx.send(()).unwrap();

    let ergebnis = tokio::time::timeout(Duration::from_secs(10), server)
        .await
        .expect("Server hat nicht rechtzeitig beendet")
        .unwrap();
    assert!(ergebnis.is_ok(), "{ergebnis:?}");
}

#[tokio::test]
async fn server_ohne_schluessel_startet_nicht() {
    let mut config = ServerConfig::default();
    config.datenbank.url = "sqlite::memory:".into();
    assert!(Server::neu(config).starten().await.is_err());
}
