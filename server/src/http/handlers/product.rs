//! Handler fuer `/katalog/product`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use katalog_core::{FabrikId, Namespace, ProduktId};
use katalog_db::{
    models::{NeuesProdukt, ProduktUpdate},
    FabrikRepository, ProduktRepository,
};

use crate::http::auth::Angemeldet;
use crate::http::{daten_antwort, ApiFehler, AppState};

const TITEL_MIN: usize = 2;
const TITEL_MAX: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ProduktAnlegenBody {
    pub title: String,
    #[serde(default)]
    pub image: String,
    pub video: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub describe_product: String,
    pub year_product: NaiveDate,
    pub factory_id: FabrikId,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProduktAendernBody {
    pub title: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub status: Option<String>,
    pub describe_product: Option<String>,
    pub year_product: Option<NaiveDate>,
    pub factory_id: Option<FabrikId>,
}

#[derive(Debug, Deserialize)]
pub struct NachFabrik {
    pub factory_id: FabrikId,
}

fn titel_pruefen(titel: &str) -> Result<&str, ApiFehler> {
    let titel = titel.trim();
    let laenge = titel.chars().count();
    if !(TITEL_MIN..=TITEL_MAX).contains(&laenge) {
        return Err(ApiFehler::eingabe(format!(
            "title muss {TITEL_MIN} bis {TITEL_MAX} Zeichen lang sein"
        )));
    }
    Ok(titel)
}

async fn fabrik_pruefen(state: &AppState, id: FabrikId) -> Result<(), ApiFehler> {
    match FabrikRepository::get_by_id(state.db.as_ref(), id).await? {
        Some(_) => Ok(()),
        None => Err(ApiFehler::eingabe(format!("Fabrik {id} existiert nicht"))),
    }
}

/// `GET /list`
pub async fn list(State(state): State<AppState>) -> Result<Response, ApiFehler> {
    let produkte = ProduktRepository::list(state.db.as_ref()).await?;
    Ok(daten_antwort(StatusCode::OK, produkte))
}

/// `GET /list/by-factory?factory_id=`
pub async fn list_by_factory(
    State(state): State<AppState>,
    Query(filter): Query<NachFabrik>,
) -> Result<Response, ApiFehler> {
    let produkte = state.db.list_by_fabrik(filter.factory_id).await?;
    Ok(daten_antwort(StatusCode::OK, produkte))
}

/// `GET /:id`
pub async fn get(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<ProduktId>,
) -> Result<Response, ApiFehler> {
    let produkt = ProduktRepository::get_by_id(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| ApiFehler::nicht_gefunden(format!("Produkt {id}")))?;
    Ok(daten_antwort(StatusCode::OK, produkt))
}

/// `POST /`
pub async fn create(
    State(state): State<AppState>,
    _: Angemeldet,
    Json(body): Json<ProduktAnlegenBody>,
) -> Result<Response, ApiFehler> {
    let titel = titel_pruefen(&body.title)?;
    fabrik_pruefen(&state, body.factory_id).await?;

    let produkt = ProduktRepository::create(
        state.db.as_ref(),
        NeuesProdukt {
            title: titel,
            image: &body.image,
            video: body.video.as_deref(),
            status: &body.status,
            describe_product: &body.describe_product,
            year_product: body.year_product,
            factory_id: body.factory_id,
        },
    )
    .await?;
    tracing::info!(product_id = %produkt.id, factory_id = %produkt.factory_id, "Produkt angelegt");

    state.melden(Namespace::Product, "created", &produkt).await;
    Ok(daten_antwort(StatusCode::CREATED, produkt))
}

/// `PATCH /upd/:id`
pub async fn update(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<ProduktId>,
    Json(body): Json<ProduktAendernBody>,
) -> Result<Response, ApiFehler> {
    let title = match body.title.as_deref() {
        Some(t) => Some(titel_pruefen(t)?.to_string()),
        None => None,
    };
    if let Some(factory_id) = body.factory_id {
        fabrik_pruefen(&state, factory_id).await?;
    }

    let produkt = ProduktRepository::update(
        state.db.as_ref(),
        id,
        ProduktUpdate {
            title,
            image: body.image,
            video: body.video,
            status: body.status,
            describe_product: body.describe_product,
            year_product: body.year_product,
            factory_id: body.factory_id,
        },
    )
    .await?;

    state.melden(Namespace::Product, "updated", &produkt).await;
    Ok(daten_antwort(StatusCode::OK, produkt))
}

/// `DELETE /del/:id`
pub async fn delete(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<ProduktId>,
) -> Result<Response, ApiFehler> {
    if !ProduktRepository::delete(state.db.as_ref(), id).await? {
        return Err(ApiFehler::nicht_gefunden(format!("Produkt {id}")));
    }
    state
        .melden(Namespace::Product, "deleted", json!({ "product_id": id }))
        .await;
    Ok(daten_antwort(StatusCode::OK, json!({ "product_id": id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titel_laenge() {
        assert!(titel_pruefen("a").is_err());
        assert!(titel_pruefen("  a  ").is_err());
        assert_eq!(titel_pruefen(" Ban ").unwrap(), "Ban");
        assert!(titel_pruefen(&"x".repeat(100)).is_ok());
        assert!(titel_pruefen(&"x".repeat(101)).is_err());
        // Zeichen, nicht Bytes
        assert!(titel_pruefen("Bàn ghế gỗ").is_ok());
    }
}
