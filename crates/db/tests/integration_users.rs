//! Integration-Tests fuer UserRepository (In-Memory SQLite)

use katalog_core::{Rolle, UserId};
use katalog_db::{
    models::{BenutzerUpdate, NeuerBenutzer},
    DbError, SqliteDb, UserRepository,
};

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

fn neuer<'a>(account: &'a str) -> NeuerBenutzer<'a> {
    NeuerBenutzer {
        full_name: "Tran Thi B",
        account,
        password_hash: "hash",
        tag: "lager",
        rolle: Rolle::User,
    }
}

#[tokio::test]
async fn benutzer_erstellen_und_laden() {
    let db = db().await;

    let user = UserRepository::create(&db, neuer("b@thientan.com"))
        .await
        .expect("Benutzer erstellen fehlgeschlagen");

    assert_eq!(user.account, "b@thientan.com");
    assert_eq!(user.rolle, Rolle::User);

    let geladen = UserRepository::get_by_id(&db, user.id)
        .await
        .expect("get_by_id fehlgeschlagen")
        .expect("Benutzer sollte gefunden werden");

    assert_eq!(geladen.id, user.id);
    assert_eq!(geladen.full_name, "Tran Thi B");
    assert_eq!(geladen.created_at, user.created_at);
}

#[tokio::test]
async fn benutzer_nach_konto_laden() {
    let db = db().await;
    UserRepository::create(&db, neuer("c@thientan.com")).await.unwrap();

    let gefunden = db
        .get_by_account("c@thientan.com")
        .await
        .unwrap()
        .expect("Konto sollte gefunden werden");
    assert_eq!(gefunden.tag, "lager");

    assert!(db.get_by_account("fehlt@thientan.com").await.unwrap().is_none());
}

#[tokio::test]
async fn doppeltes_konto_ergibt_eindeutigkeit() {
    let db = db().await;
    UserRepository::create(&db, neuer("d@thientan.com")).await.unwrap();

    let err = UserRepository::create(&db, neuer("d@thientan.com"))
        .await
        .unwrap_err();
    assert!(err.ist_eindeutigkeit(), "erwartet Eindeutigkeit, war: {err}");
}

#[tokio::test]
async fn benutzer_teilweise_aktualisieren() {
    let db = db().await;
    let user = UserRepository::create(&db, neuer("e@thientan.com")).await.unwrap();

    let aktualisiert = UserRepository::update(
        &db,
        user.id,
        BenutzerUpdate {
            tag: Some("vertrieb".into()),
            rolle: Some(Rolle::Admin),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(aktualisiert.tag, "vertrieb");
    assert_eq!(aktualisiert.rolle, Rolle::Admin);
    assert_eq!(aktualisiert.full_name, "Tran Thi B");
    assert_eq!(aktualisiert.password_hash, "hash");
    assert!(aktualisiert.updated_at >= user.updated_at);
}

#[tokio::test]
async fn unbekannten_benutzer_aktualisieren() {
    let db = db().await;
    let err = UserRepository::update(
        &db,
        UserId::new(),
        BenutzerUpdate {
            full_name: Some("x".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DbError::NichtGefunden(_)));
}

#[tokio::test]
async fn benutzer_loeschen_und_auflisten() {
    let db = db().await;
    let a = UserRepository::create(&db, neuer("f@thientan.com")).await.unwrap();
    UserRepository::create(&db, neuer("g@thientan.com")).await.unwrap();

    assert_eq!(UserRepository::list(&db).await.unwrap().len(), 2);

    assert!(UserRepository::delete(&db, a.id).await.unwrap());
    assert!(!UserRepository::delete(&db, a.id).await.unwrap());

    let rest = UserRepository::list(&db).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].account, "g@thientan.com");
}
