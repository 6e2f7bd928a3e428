//! Integrationstests fuer Standorte, Fabriken und Produkte samt Ereignissen

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};

use katalog_core::{Namespace, Rolle, UserId};
use katalog_realtime::{Identitaet, Registrierung};

use common::{test_app, TestApp};

async fn abonnent(app: &TestApp, namespace: Namespace) -> Registrierung {
    let mut reg = app
        .state
        .hub
        .registrieren(Identitaet {
            user_id: UserId::new(),
            rolle: Rolle::User,
            namespace,
        })
        .await
        .unwrap();
    app.state.hub.abonnieren(reg.id).await.unwrap();
    assert_eq!(reg.empfaenger.recv().await.unwrap().event, "connected");
    assert_eq!(reg.empfaenger.recv().await.unwrap().event, "subscribed");
    reg
}

async fn standort_anlegen(app: &TestApp, token: &str, name: &str) -> Value {
    let antwort = app
        .senden(
            "POST",
            "/katalog/location",
            Some(token),
            None,
            Some(json!({ "name_local": name })),
        )
        .await;
    assert_eq!(antwort.status, StatusCode::CREATED, "{:?}", antwort.json);
    antwort.json["data"].clone()
}

#[tokio::test]
async fn standort_anlegen_meldet_genau_ein_ereignis() {
    let app = test_app().await;
    let token = app.registrieren("a@thientan.com").await.access_token();
    let mut standorte = abonnent(&app, Namespace::Location).await;
    let mut produkte = abonnent(&app, Namespace::Product).await;

    let standort = standort_anlegen(&app, &token, "Binh Duong").await;

    let ereignis = standorte.empfaenger.recv().await.unwrap();
    assert_eq!(ereignis.event, "location:created");
    assert_eq!(ereignis.data["location_id"], standort["location_id"]);
    assert_eq!(ereignis.data["name_local"], "Binh Duong");
    assert_eq!(ereignis.data["created_at"], standort["created_at"]);

    let weitere = tokio::time::timeout(Duration::from_millis(50), standorte.empfaenger.recv()).await;
    assert!(weitere.is_err());
    let fremd = tokio::time::timeout(Duration::from_millis(50), produkte.empfaenger.recv()).await;
    assert!(fremd.is_err());
}

#[tokio::test]
async fn standort_crud() {
    let app = test_app().await;
    let token = app.registrieren("a@thientan.com").await.access_token();

    let ohne_token = app
        .senden("POST", "/katalog/location", None, None, Some(json!({ "name_local": "X" })))
        .await;
    assert_eq!(ohne_token.status, StatusCode::UNAUTHORIZED);

    let leer = app
        .senden("POST", "/katalog/location", Some(&token), None, Some(json!({ "name_local": "  " })))
        .await;
    assert_eq!(leer.status, StatusCode::BAD_REQUEST);

    let standort = standort_anlegen(&app, &token, "Hanoi").await;
    let id = standort["location_id"].as_str().unwrap();

    let liste = app.senden("GET", "/katalog/location/list", None, None, None).await;
    assert_eq!(liste.status, StatusCode::OK);
    assert_eq!(liste.json["data"].as_array().unwrap().len(), 1);

    let geaendert = app
        .senden(
            "PATCH",
            &format!("/katalog/location/upd/{id}"),
            Some(&token),
            None,
            Some(json!({ "name_local": "Ha Noi" })),
        )
        .await;
    assert_eq!(geaendert.status, StatusCode::OK);
    assert_eq!(geaendert.json["data"]["name_local"], "Ha Noi");

    let geladen = app
        .senden("GET", &format!("/katalog/location/{id}"), Some(&token), None, None)
        .await;
    assert_eq!(geladen.json["data"]["name_local"], "Ha Noi");

    let geloescht = app
        .senden("DELETE", &format!("/katalog/location/del/{id}"), Some(&token), None, None)
        .await;
    assert_eq!(geloescht.status, StatusCode::OK);

    let weg = app
        .senden("GET", &format!("/katalog/location/{id}"), Some(&token), None, None)
        .await;
    assert_eq!(weg.status, StatusCode::NOT_FOUND);
    assert_eq!(weg.json["error"]["code"], 404);
}

#[tokio::test]
async fn fabrik_braucht_vorhandenen_standort() {
    let app = test_app().await;
    let token = app.registrieren("a@thientan.com").await.access_token();

    let antwort = app
        .senden(
            "POST",
            "/katalog/factory",
            Some(&token),
            None,
            Some(json!({
                "name_factory": "Xuong 1",
                "location_id": UserId::new().to_string(),
            })),
        )
        .await;
    assert_eq!(antwort.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fabrik_und_produkt_kette() {
    let app = test_app().await;
    let token = app.registrieren("a@thientan.com").await.access_token();
    let mut fabriken = abonnent(&app, Namespace::Factory).await;
    let mut produkte = abonnent(&app, Namespace::Product).await;

    let standort = standort_anlegen(&app, &token, "Dong Nai").await;
    let location_id = standort["location_id"].as_str().unwrap();

    let fabrik = app
        .senden(
            "POST",
            "/katalog/factory",
            Some(&token),
            None,
            Some(json!({ "name_factory": "Xuong Go", "location_id": location_id })),
        )
        .await;
    assert_eq!(fabrik.status, StatusCode::CREATED);
    let factory_id = fabrik.json["data"]["factory_id"].as_str().unwrap().to_string();

    let ereignis = fabriken.empfaenger.recv().await.unwrap();
    assert_eq!(ereignis.event, "factory:created");
    assert_eq!(ereignis.data["factory_id"], factory_id.as_str());
    assert_eq!(ereignis.data["location_id"], location_id);

    let nach_standort = app
        .senden(
            "GET",
            &format!("/katalog/factory/list/by-local?location_id={location_id}"),
            None,
            None,
            None,
        )
        .await;
    assert_eq!(nach_standort.status, StatusCode::OK);
    assert_eq!(nach_standort.json["data"].as_array().unwrap().len(), 1);

    let kurzer_titel = app
        .senden(
            "POST",
            "/katalog/product",
            Some(&token),
            None,
            Some(json!({
                "title": "B",
                "image": "ban.png",
                "status": "active",
                "describe_product": "Ban an",
                "year_product": "2024-01-15",
                "factory_id": factory_id,
            })),
        )
        .await;
    assert_eq!(kurzer_titel.status, StatusCode::BAD_REQUEST);

    let produkt = app
        .senden(
            "POST",
            "/katalog/product",
            Some(&token),
            None,
            Some(json!({
                "title": "Ban an go",
                "image": "ban.png",
                "status": "active",
                "describe_product": "Ban an bang go soi",
                "year_product": "2024-01-15",
                "factory_id": factory_id,
            })),
        )
        .await;
    assert_eq!(produkt.status, StatusCode::CREATED, "{:?}", produkt.json);
    let product_id = produkt.json["data"]["product_id"].as_str().unwrap().to_string();

    let ereignis = produkte.empfaenger.recv().await.unwrap();
    assert_eq!(ereignis.event, "product:created");
    assert_eq!(ereignis.data["title"], "Ban an go");
    assert_eq!(ereignis.data["year_product"], "2024-01-15");

    let nach_fabrik = app
        .senden(
            "GET",
            &format!("/katalog/product/list/by-factory?factory_id={factory_id}"),
            None,
            None,
            None,
        )
        .await;
    assert_eq!(nach_fabrik.json["data"].as_array().unwrap().len(), 1);

    let geaendert = app
        .senden(
            "PATCH",
            &format!("/katalog/product/upd/{product_id}"),
            Some(&token),
            None,
            Some(json!({ "status": "sold" })),
        )
        .await;
    assert_eq!(geaendert.status, StatusCode::OK);
    assert_eq!(geaendert.json["data"]["status"], "sold");
    assert_eq!(produkte.empfaenger.recv().await.unwrap().event, "product:updated");

    // Loeschen der Fabrik entfernt auch das Produkt
    let geloescht = app
        .senden("DELETE", &format!("/katalog/factory/del/{factory_id}"), Some(&token), None, None)
        .await;
    assert_eq!(geloescht.status, StatusCode::OK);
    let ereignis = fabriken.empfaenger.recv().await.unwrap();
    assert_eq!(ereignis.event, "factory:deleted");
    assert_eq!(ereignis.data, json!({ "factory_id": factory_id }));

    let weg = app
        .senden("GET", &format!("/katalog/product/{product_id}"), Some(&token), None, None)
        .await;
    assert_eq!(weg.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn benutzer_ereignisse() {
    let app = test_app().await;
    let mut benutzer = abonnent(&app, Namespace::Users).await;

    let token = app.registrieren("a@thientan.com").await.access_token();
    let ereignis = benutzer.empfaenger.recv().await.unwrap();
    assert_eq!(ereignis.event, "users:created");
    assert_eq!(ereignis.data["account"], "a@thientan.com");
    assert!(ereignis.data.get("password_hash").is_none());

    app.senden(
        "PATCH",
        "/katalog/users/upd",
        Some(&token),
        None,
        Some(json!({ "full_name": "Neuer Name" })),
    )
    .await;
    let ereignis = benutzer.empfaenger.recv().await.unwrap();
    assert_eq!(ereignis.event, "users:updated");
    assert_eq!(ereignis.data["full_name"], "Neuer Name");
}
