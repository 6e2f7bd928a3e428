//! Handler fuer `/katalog/location`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use katalog_core::{Namespace, StandortId};
use katalog_db::StandortRepository;

use crate::http::auth::Angemeldet;
use crate::http::{daten_antwort, ApiFehler, AppState};

#[derive(Debug, Deserialize)]
pub struct StandortBody {
    pub name_local: String,
}

impl StandortBody {
    fn name(&self) -> Result<&str, ApiFehler> {
        let name = self.name_local.trim();
        if name.is_empty() {
            return Err(ApiFehler::eingabe("name_local darf nicht leer sein"));
        }
        Ok(name)
    }
}

/// `GET /list`
pub async fn list(State(state): State<AppState>) -> Result<Response, ApiFehler> {
    let standorte = StandortRepository::list(state.db.as_ref()).await?;
    Ok(daten_antwort(StatusCode::OK, standorte))
}

/// `GET /:id`
pub async fn get(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<StandortId>,
) -> Result<Response, ApiFehler> {
    let standort = StandortRepository::get_by_id(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| ApiFehler::nicht_gefunden(format!("Standort {id}")))?;
    Ok(daten_antwort(StatusCode::OK, standort))
}

/// `POST /`
pub async fn create(
    State(state): State<AppState>,
    _: Angemeldet,
    Json(body): Json<StandortBody>,
) -> Result<Response, ApiFehler> {
    let standort = StandortRepository::create(state.db.as_ref(), body.name()?).await?;
    tracing::info!(location_id = %standort.id, "Standort angelegt");

    state
        .melden(
            Namespace::Location,
            "created",
            json!({
                "location_id": standort.id,
                "name_local": standort.name_local,
                "created_at": standort.created_at,
            }),
        )
        .await;
    Ok(daten_antwort(StatusCode::CREATED, standort))
}

/// `PATCH /upd/:id`
pub async fn update(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<StandortId>,
    Json(body): Json<StandortBody>,
) -> Result<Response, ApiFehler> {
    let standort = StandortRepository::update(state.db.as_ref(), id, body.name()?).await?;

    state
        .melden(
            Namespace::Location,
            "updated",
            json!({
                "location_id": standort.id,
                "name_local": standort.name_local,
                "updated_at": standort.updated_at,
            }),
        )
        .await;
    Ok(daten_antwort(StatusCode::OK, standort))
}

/// `DELETE /del/:id` – entfernt auch die Fabriken und Produkte des Standorts
pub async fn delete(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<StandortId>,
) -> Result<Response, ApiFehler> {
    if !StandortRepository::delete(state.db.as_ref(), id).await? {
        return Err(ApiFehler::nicht_gefunden(format!("Standort {id}")));
    }
    state
        .melden(Namespace::Location, "deleted", json!({ "location_id": id }))
        .await;
    Ok(daten_antwort(StatusCode::OK, json!({ "location_id": id })))
}
