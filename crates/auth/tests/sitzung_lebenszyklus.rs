//! Integration-Tests fuer den Sitzungslebenszyklus gegen SQLite

use std::sync::Arc;

use chrono::Utc;
use katalog_auth::{
    AuthError, AuthKonfig, AuthService, PasswortKosten, Registrierung, TokenCodec,
};
use katalog_db::{RefreshTokenRepository, SqliteDb};

const PASSWORT: &str = "Sicher#2024";

async fn service() -> (AuthService<SqliteDb, SqliteDb>, Arc<SqliteDb>) {
    let db = Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory DB konnte nicht erstellt werden"),
    );
    let codec = Arc::new(TokenCodec::neu(b"integrationstest-schluessel").unwrap());
    let svc = AuthService::neu(
        Arc::clone(&db),
        Arc::clone(&db),
        codec,
        AuthKonfig {
            konto_domain: Some("thientan.com".into()),
            passwort_kosten: PasswortKosten::minimal(),
            ..Default::default()
        },
    );
    (svc, db)
}

async fn aktive_tokens(db: &SqliteDb, user_id: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ? AND revoked = 0",
    )
    .bind(user_id)
    .fetch_one(db.pool())
    .await
    .unwrap()
}

fn konto(account: &str) -> Registrierung<'_> {
    Registrierung {
        full_name: "Tran Thi B",
        account,
        passwort: PASSWORT,
        tag: "verkauf",
    }
}

#[tokio::test]
async fn doppelte_anmeldung_hinterlaesst_einen_aktiven_token() {
    let (svc, db) = service().await;
    let (benutzer, _) = svc.registrieren(konto("b@thientan.com")).await.unwrap();

    svc.anmelden("b@thientan.com", PASSWORT, None).await.unwrap();
    svc.anmelden("b@thientan.com", PASSWORT, None).await.unwrap();

    assert_eq!(aktive_tokens(&db, &benutzer.id.to_string()).await, 1);
}

#[tokio::test]
async fn erneuern_laesst_refresh_token_gueltig() {
    let (svc, db) = service().await;
    svc.registrieren(konto("c@thientan.com")).await.unwrap();
    let anmeldung = svc.anmelden("c@thientan.com", PASSWORT, None).await.unwrap();

    let zugang = svc
        .access_erneuern(&anmeldung.tokens.refresh_token)
        .await
        .unwrap();
    assert!(zugang.laeuft_ab_am > Utc::now());

    let record = db
        .get_by_token(&anmeldung.tokens.refresh_token)
        .await
        .unwrap()
        .expect("Refresh-Token muss gespeichert sein");
    assert!(record.ist_aktiv(Utc::now()));
}

#[tokio::test]
async fn widerruf_sperrt_erneuerung() {
    let (svc, db) = service().await;
    let (benutzer, tokens) = svc.registrieren(konto("d@thientan.com")).await.unwrap();

    assert_eq!(db.revoke_by_user(benutzer.id).await.unwrap(), 1);

    let err = svc.access_erneuern(&tokens.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenWiderrufen));
}

#[tokio::test]
async fn anmelden_mit_cookie_nach_abmeldung_erzeugt_neuen_token() {
    let (svc, db) = service().await;
    let (benutzer, tokens) = svc.registrieren(konto("e@thientan.com")).await.unwrap();

    assert!(svc.abmelden(&tokens.refresh_token).await.unwrap());

    let anmeldung = svc
        .anmelden("e@thientan.com", PASSWORT, Some(&tokens.refresh_token))
        .await
        .unwrap();
    assert!(!anmeldung.refresh_wiederverwendet);
    assert_eq!(aktive_tokens(&db, &benutzer.id.to_string()).await, 1);
}

#[tokio::test]
async fn geloeschtes_konto_entfernt_tokens() {
    let (svc, db) = service().await;
    let (root, _) = svc.registrieren(konto("root@thientan.com")).await.unwrap();
    let (user, tokens) = svc.registrieren(konto("f@thientan.com")).await.unwrap();

    sqlx::query("UPDATE users SET role_user = 'ROOT' WHERE id = ?")
        .bind(root.id.to_string())
        .execute(db.pool())
        .await
        .unwrap();

    svc.benutzer_loeschen(root.id, user.id).await.unwrap();

    assert!(db.get_by_token(&tokens.refresh_token).await.unwrap().is_none());
}
