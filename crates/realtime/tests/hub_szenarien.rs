//! Szenario-Tests fuer den Echtzeit-Hub

use std::time::Duration;

use katalog_core::{Ereignis, Namespace, Rolle, UserId};
use katalog_observability::KatalogMetriken;
use katalog_realtime::{Hub, HubKonfig, HubStatistik, Identitaet, Registrierung};
use serde_json::json;

fn hub_starten() -> Hub {
    let (hub, _task) = Hub::starten(HubKonfig::default(), KatalogMetriken::neu().unwrap());
    hub
}

/// Registriert und abonniert; Bestaetigungen werden verworfen
async fn abonnent(hub: &Hub, namespace: Namespace) -> Registrierung {
    let mut reg = hub
        .registrieren(Identitaet {
            user_id: UserId::new(),
            rolle: Rolle::User,
            namespace,
        })
        .await
        .unwrap();
    hub.abonnieren(reg.id).await.unwrap();
    assert_eq!(reg.empfaenger.recv().await.unwrap().event, "connected");
    assert_eq!(reg.empfaenger.recv().await.unwrap().event, "subscribed");
    reg
}

async fn nichts_empfangen(reg: &mut Registrierung) {
    let ergebnis = tokio::time::timeout(Duration::from_millis(50), reg.empfaenger.recv()).await;
    assert!(ergebnis.is_err(), "unerwartete Nachricht: {ergebnis:?}");
}

#[tokio::test]
async fn product_ereignis_nur_an_product_raeume() {
    let hub = hub_starten();
    let mut produkt_a = abonnent(&hub, Namespace::Product).await;
    let mut produkt_b = abonnent(&hub, Namespace::Product).await;
    let mut fabrik = abonnent(&hub, Namespace::Factory).await;
    let mut standort = abonnent(&hub, Namespace::Location).await;
    let mut benutzer = abonnent(&hub, Namespace::Users).await;

    hub.broadcast(Ereignis::neu("product:created", json!({"title": "Ban ghe"})))
        .await;

    for reg in [&mut produkt_a, &mut produkt_b] {
        let e = reg.empfaenger.recv().await.unwrap();
        assert_eq!(e.event, "product:created");
        assert_eq!(e.data["title"], "Ban ghe");
    }
    for reg in [&mut fabrik, &mut standort, &mut benutzer] {
        nichts_empfangen(reg).await;
    }
}

#[tokio::test]
async fn location_created_genau_einmal() {
    let hub = hub_starten();
    let mut client = abonnent(&hub, Namespace::Location).await;

    let daten = json!({
        "location_id": "7f1c2a4e-0000-4000-8000-000000000001",
        "name_local": "Binh Duong",
        "created_at": "2024-05-01T08:00:00.000000Z",
    });
    hub.broadcast(Ereignis::domain(Namespace::Location, "created", daten.clone()))
        .await;

    let e = client.empfaenger.recv().await.unwrap();
    assert_eq!(e.event, "location:created");
    assert_eq!(e.data["location_id"], daten["location_id"]);
    assert_eq!(e.data["name_local"], "Binh Duong");

    nichts_empfangen(&mut client).await;
}

#[tokio::test]
async fn doppeltes_abmelden_ist_idempotent() {
    let hub = hub_starten();
    let erster = abonnent(&hub, Namespace::Factory).await;
    let mut zweiter = abonnent(&hub, Namespace::Factory).await;

    hub.abmelden(erster.id).await;
    hub.abmelden(erster.id).await;

    assert_eq!(
        hub.raum_mitglieder("/factory:factory-room").await,
        vec![zweiter.id]
    );
    assert_eq!(hub.raum_mitglieder("/factory").await, vec![zweiter.id]);

    hub.broadcast(Ereignis::neu("factory:updated", json!({"factory_id": "f"})))
        .await;
    assert_eq!(
        zweiter.empfaenger.recv().await.unwrap().event,
        "factory:updated"
    );
}

#[tokio::test]
async fn abmelden_schliesst_queue_und_loescht_leere_raeume() {
    let hub = hub_starten();
    let mut reg = abonnent(&hub, Namespace::Users).await;

    hub.abmelden(reg.id).await;

    assert!(reg.empfaenger.recv().await.is_none());
    assert_eq!(hub.statistik().await, HubStatistik::default());
}

#[tokio::test]
async fn reihenfolge_im_raum_bleibt_erhalten() {
    let hub = hub_starten();
    let mut reg = abonnent(&hub, Namespace::Product).await;

    for verb in ["created", "updated", "deleted"] {
        hub.broadcast(Ereignis::domain(Namespace::Product, verb, json!({})))
            .await;
    }

    for erwartet in ["product:created", "product:updated", "product:deleted"] {
        assert_eq!(reg.empfaenger.recv().await.unwrap().event, erwartet);
    }
}

#[tokio::test]
async fn herunterfahren_schliesst_alles() {
    let hub = hub_starten();
    let mut a = abonnent(&hub, Namespace::Users).await;
    let mut b = abonnent(&hub, Namespace::Product).await;

    hub.herunterfahren().await;

    assert!(a.empfaenger.recv().await.is_none());
    assert!(b.empfaenger.recv().await.is_none());

    // Danach wirkungslos
    assert_eq!(hub.statistik().await, HubStatistik::default());
    hub.abmelden(a.id).await;
    hub.broadcast(Ereignis::neu("users:created", json!({}))).await;
    assert!(hub
        .registrieren(Identitaet {
            user_id: UserId::new(),
            rolle: Rolle::Admin,
            namespace: Namespace::Users,
        })
        .await
        .is_err());
    hub.herunterfahren().await;
}
