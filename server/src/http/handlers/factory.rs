//! Handler fuer `/katalog/factory`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use katalog_core::{FabrikId, Namespace, StandortId};
use katalog_db::{
    models::{FabrikRecord, FabrikUpdate, NeueFabrik},
    FabrikRepository, StandortRepository,
};

use crate::http::auth::Angemeldet;
use crate::http::{daten_antwort, ApiFehler, AppState};

#[derive(Debug, Deserialize)]
pub struct FabrikAnlegenBody {
    pub name_factory: String,
    pub location_id: StandortId,
}

#[derive(Debug, Deserialize)]
pub struct FabrikAendernBody {
    pub name_factory: Option<String>,
    pub location_id: Option<StandortId>,
}

#[derive(Debug, Deserialize)]
pub struct NachStandort {
    pub location_id: StandortId,
}

/// Nutzdaten fuer `factory:created` / `factory:updated`
fn ereignis_daten(fabrik: &FabrikRecord, zeit_feld: &str) -> serde_json::Value {
    let zeit = if zeit_feld == "created_at" {
        fabrik.created_at
    } else {
        fabrik.updated_at
    };
    let mut daten = json!({
        "factory_id": fabrik.id,
        "name_factory": fabrik.name_factory,
        "location_id": fabrik.location_id,
    });
    daten[zeit_feld] = json!(zeit);
    daten
}

fn name_pruefen(name: &str) -> Result<&str, ApiFehler> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiFehler::eingabe("name_factory darf nicht leer sein"));
    }
    Ok(name)
}

/// Unbekannte Standorte sind ein Eingabefehler, kein 404
async fn standort_pruefen(state: &AppState, id: StandortId) -> Result<(), ApiFehler> {
    match StandortRepository::get_by_id(state.db.as_ref(), id).await? {
        Some(_) => Ok(()),
        None => Err(ApiFehler::eingabe(format!("Standort {id} existiert nicht"))),
    }
}

/// `GET /list`
pub async fn list(State(state): State<AppState>) -> Result<Response, ApiFehler> {
    let fabriken = FabrikRepository::list(state.db.as_ref()).await?;
    Ok(daten_antwort(StatusCode::OK, fabriken))
}

/// `GET /list/by-local?location_id=`
pub async fn list_by_local(
    State(state): State<AppState>,
    Query(filter): Query<NachStandort>,
) -> Result<Response, ApiFehler> {
    let fabriken = state.db.list_by_standort(filter.location_id).await?;
    Ok(daten_antwort(StatusCode::OK, fabriken))
}

/// `GET /:id`
pub async fn get(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<FabrikId>,
) -> Result<Response, ApiFehler> {
    let fabrik = FabrikRepository::get_by_id(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| ApiFehler::nicht_gefunden(format!("Fabrik {id}")))?;
    Ok(daten_antwort(StatusCode::OK, fabrik))
}

/// `POST /`
pub async fn create(
    State(state): State<AppState>,
    _: Angemeldet,
    Json(body): Json<FabrikAnlegenBody>,
) -> Result<Response, ApiFehler> {
    let name = name_pruefen(&body.name_factory)?;
    standort_pruefen(&state, body.location_id).await?;

    let fabrik = FabrikRepository::create(
        state.db.as_ref(),
        NeueFabrik {
            name_factory: name,
            location_id: body.location_id,
        },
    )
    .await?;
    tracing::info!(factory_id = %fabrik.id, location_id = %fabrik.location_id, "Fabrik angelegt");

    state
        .melden(Namespace::Factory, "created", ereignis_daten(&fabrik, "created_at"))
        .await;
    Ok(daten_antwort(StatusCode::CREATED, fabrik))
}

/// `PATCH /upd/:id`
pub async fn update(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<FabrikId>,
    Json(body): Json<FabrikAendernBody>,
) -> Result<Response, ApiFehler> {
    let name_factory = match body.name_factory.as_deref() {
        Some(name) => Some(name_pruefen(name)?.to_string()),
        None => None,
    };
    if let Some(location_id) = body.location_id {
        standort_pruefen(&state, location_id).await?;
    }

    let fabrik = FabrikRepository::update(
        state.db.as_ref(),
        id,
        FabrikUpdate {
            name_factory,
            location_id: body.location_id,
        },
    )
    .await?;

    state
        .melden(Namespace::Factory, "updated", ereignis_daten(&fabrik, "updated_at"))
        .await;
    Ok(daten_antwort(StatusCode::OK, fabrik))
}

/// `DELETE /del/:id`
pub async fn delete(
    State(state): State<AppState>,
    _: Angemeldet,
    Path(id): Path<FabrikId>,
) -> Result<Response, ApiFehler> {
    if !FabrikRepository::delete(state.db.as_ref(), id).await? {
        return Err(ApiFehler::nicht_gefunden(format!("Fabrik {id}")));
    }
    state
        .melden(Namespace::Factory, "deleted", json!({ "factory_id": id }))
        .await;
    Ok(daten_antwort(StatusCode::OK, json!({ "factory_id": id })))
}
