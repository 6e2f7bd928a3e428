//! Gemeinsame Helfer fuer die Server-Integrationstests
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use katalog_auth::{AuthKonfig, AuthService, PasswortKosten, TokenCodec};
use katalog_db::SqliteDb;
use katalog_observability::KatalogMetriken;
use katalog_realtime::{Hub, HubKonfig};
use katalog_server::{app_router, AppState};

pub const PASSWORT: &str = "Sicher#2024";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn test_app() -> TestApp {
    let db = Arc::new(SqliteDb::in_memory().await.unwrap());
    let codec = TokenCodec::neu(b"server-integrationstest").unwrap();
    let auth = Arc::new(AuthService::neu(
        db.clone(),
        db.clone(),
        Arc::new(codec),
        AuthKonfig {
            konto_domain: Some("thientan.com".into()),
            passwort_kosten: PasswortKosten::minimal(),
            ..Default::default()
        },
    ));
    let metriken = KatalogMetriken::neu().unwrap();
    let (hub, _task) = Hub::starten(HubKonfig::default(), metriken.clone());
    let state = AppState::neu(db, auth, hub, metriken, false);
    TestApp {
        router: app_router(state.clone(), &[]),
        state,
    }
}

/// Antwort eines Oneshot-Aufrufs
pub struct Antwort {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl Antwort {
    /// `refresh_token=<wert>` aus dem Set-Cookie-Header, fuer den Cookie-Header
    pub fn refresh_cookie(&self) -> Option<String> {
        self.set_cookie()
            .and_then(|c| c.split(';').next().map(str::to_string))
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("refresh_token="))
            .map(str::to_string)
    }

    pub fn access_token(&self) -> String {
        self.json["access_token"].as_str().unwrap().to_string()
    }
}

impl TestApp {
    pub async fn senden(
        &self,
        methode: &str,
        pfad: &str,
        token: Option<&str>,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Antwort {
        let mut builder = Request::builder().method(methode).uri(pfad);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Antwort {
            status,
            headers,
            json,
        }
    }

    pub async fn registrieren(&self, account: &str) -> Antwort {
        let antwort = self
            .senden(
                "POST",
                "/katalog/users/sign-up",
                None,
                None,
                Some(serde_json::json!({
                    "full_name": "Nguyen Van A",
                    "account": account,
                    "password_user": PASSWORT,
                    "tag": "verkauf",
                })),
            )
            .await;
        assert_eq!(antwort.status, StatusCode::CREATED, "{:?}", antwort.json);
        antwort
    }

    pub async fn anmelden(&self, account: &str, cookie: Option<&str>) -> Antwort {
        self.senden(
            "POST",
            "/katalog/users/sign-in",
            None,
            cookie,
            Some(serde_json::json!({
                "account": account,
                "password_user": PASSWORT,
            })),
        )
        .await
    }

    /// Setzt die Rolle direkt in der Datenbank und meldet neu an
    pub async fn mit_rolle(&self, account: &str, rolle: &str) -> String {
        sqlx::query("UPDATE users SET role_user = ? WHERE account = ?")
            .bind(rolle)
            .bind(account)
            .execute(self.state.db.pool())
            .await
            .unwrap();
        let antwort = self.anmelden(account, None).await;
        assert_eq!(antwort.status, StatusCode::OK);
        antwort.access_token()
    }
}
