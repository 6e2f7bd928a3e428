//! Handler fuer `/katalog/users`: Sitzungen, Passwoerter, Benutzerverwaltung

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use katalog_auth::{ProfilUpdate, Registrierung};
use katalog_core::{Namespace, Rolle, UserId};

use crate::http::auth::{Angemeldet, Verwalter};
use crate::http::cookies::{self, refresh_aus_jar, refresh_cookie, refresh_cookie_loeschen};
use crate::http::{daten_antwort, ApiFehler, AppState};

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    pub full_name: String,
    pub account: String,
    pub password_user: String,
    #[serde(default)]
    pub tag: String,
}

/// `POST /sign-up` – eigenes Konto anlegen (immer Rolle USER)
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignUpBody>,
) -> Result<Response, ApiFehler> {
    let (benutzer, tokens) = state
        .auth
        .registrieren(Registrierung {
            full_name: &body.full_name,
            account: &body.account,
            passwort: &body.password_user,
            tag: &body.tag,
        })
        .await?;

    let jar = jar.add(refresh_cookie(
        tokens.refresh_token,
        cookies::max_age(state.auth.konfig().refresh_ttl),
        state.cookie_secure,
    ));
    state.melden(Namespace::Users, "created", &benutzer).await;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "data": benutzer,
            "access_token": tokens.access_token,
            "expires_in": state.auth.konfig().access_ttl.num_seconds(),
        })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct SignInBody {
    pub account: String,
    pub password_user: String,
}

/// `POST /sign-in` – ein vorhandener, aktiver Refresh-Cookie wird weiterverwendet
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignInBody>,
) -> Result<Response, ApiFehler> {
    let vorhanden = refresh_aus_jar(&jar);
    let anmeldung = state
        .auth
        .anmelden(&body.account, &body.password_user, vorhanden.as_deref())
        .await?;

    let max_age = if anmeldung.refresh_wiederverwendet {
        cookies::restlaufzeit(anmeldung.tokens.refresh_laeuft_ab)
    } else {
        cookies::max_age(state.auth.konfig().refresh_ttl)
    };
    let jar = jar.add(refresh_cookie(
        anmeldung.tokens.refresh_token,
        max_age,
        state.cookie_secure,
    ));

    Ok((
        jar,
        Json(json!({
            "data": anmeldung.benutzer,
            "access_token": anmeldung.tokens.access_token,
            "expires_in": state.auth.konfig().access_ttl.num_seconds(),
        })),
    )
        .into_response())
}

/// `POST /sign-out` – loescht den Refresh-Token; der Cookie wird immer entfernt
pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> Result<Response, ApiFehler> {
    if let Some(token) = refresh_aus_jar(&jar) {
        state.auth.abmelden(&token).await?;
    }
    Ok((
        jar.add(refresh_cookie_loeschen()),
        Json(json!({ "data": "Abgemeldet" })),
    )
        .into_response())
}

/// `POST /refresh-token` – neuer Access-Token aus dem Refresh-Cookie
pub async fn refresh_token(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = refresh_aus_jar(&jar) else {
        return (
            jar.add(refresh_cookie_loeschen()),
            ApiFehler::NichtAngemeldet("Refresh-Token fehlt".into()),
        )
            .into_response();
    };

    match state.auth.access_erneuern(&token).await {
        Ok(zugang) => Json(json!({
            "access_token": zugang.access_token,
            "expires_in": state.auth.konfig().access_ttl_refresh.num_seconds(),
        }))
        .into_response(),
        // Speicherfehler lassen den Cookie stehen
        Err(e) if !e.ist_authentifizierung() => ApiFehler::from(e).into_response(),
        Err(e) => (jar.add(refresh_cookie_loeschen()), ApiFehler::from(e)).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswortVergessenBody {
    pub account: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// `PATCH /forgot`
pub async fn forgot(
    State(state): State<AppState>,
    Json(body): Json<PasswortVergessenBody>,
) -> Result<Response, ApiFehler> {
    state
        .auth
        .passwort_vergessen(&body.account, &body.new_password, &body.confirm_password)
        .await?;
    Ok(daten_antwort(StatusCode::OK, "Passwort zurueckgesetzt"))
}

/// `GET /list`
pub async fn list(State(state): State<AppState>) -> Result<Response, ApiFehler> {
    let benutzer = state.auth.benutzer_liste().await?;
    Ok(daten_antwort(StatusCode::OK, benutzer))
}

/// `GET /profile`
pub async fn profile(
    State(state): State<AppState>,
    Angemeldet(claims): Angemeldet,
) -> Result<Response, ApiFehler> {
    let benutzer = state.auth.profil(claims.sub).await?;
    Ok(daten_antwort(StatusCode::OK, benutzer))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfilBody {
    pub full_name: Option<String>,
    pub tag: Option<String>,
}

impl From<ProfilBody> for ProfilUpdate {
    fn from(body: ProfilBody) -> Self {
        Self {
            full_name: body.full_name,
            tag: body.tag,
        }
    }
}

/// `PATCH /upd` – Name und Tag des eigenen Kontos
pub async fn update_self(
    State(state): State<AppState>,
    Angemeldet(claims): Angemeldet,
    Json(body): Json<ProfilBody>,
) -> Result<Response, ApiFehler> {
    let benutzer = state.auth.profil_aktualisieren(claims.sub, body.into()).await?;
    state.melden(Namespace::Users, "updated", &benutzer).await;
    Ok(daten_antwort(StatusCode::OK, benutzer))
}

#[derive(Debug, Deserialize)]
pub struct PasswortAendernBody {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// `PATCH /updPwd`
pub async fn update_password(
    State(state): State<AppState>,
    Angemeldet(claims): Angemeldet,
    Json(body): Json<PasswortAendernBody>,
) -> Result<Response, ApiFehler> {
    state
        .auth
        .passwort_aendern(
            claims.sub,
            &body.old_password,
            &body.new_password,
            &body.confirm_password,
        )
        .await?;
    Ok(daten_antwort(StatusCode::OK, "Passwort geaendert"))
}

#[derive(Debug, Deserialize)]
pub struct BenutzerAnlegenBody {
    pub full_name: String,
    pub account: String,
    pub password_user: String,
    #[serde(default)]
    pub tag: String,
    pub role_user: Option<String>,
}

/// `POST /createUser` – ROOT legt beliebige Rollen an, ADMIN nur USER
pub async fn create_user(
    State(state): State<AppState>,
    Verwalter(claims): Verwalter,
    Json(body): Json<BenutzerAnlegenBody>,
) -> Result<Response, ApiFehler> {
    let rolle = body.role_user.as_deref().map(Rolle::parsen).unwrap_or_default();
    let benutzer = state
        .auth
        .benutzer_anlegen(
            claims.sub,
            Registrierung {
                full_name: &body.full_name,
                account: &body.account,
                passwort: &body.password_user,
                tag: &body.tag,
            },
            rolle,
        )
        .await?;
    state.melden(Namespace::Users, "createdbyrole", &benutzer).await;
    Ok(daten_antwort(StatusCode::CREATED, benutzer))
}

#[derive(Debug, Deserialize)]
pub struct BenutzerAendernBody {
    pub full_name: Option<String>,
    pub tag: Option<String>,
    pub role_user: Option<String>,
}

/// `PATCH /updUser/:id`
pub async fn update_user(
    State(state): State<AppState>,
    Verwalter(claims): Verwalter,
    Path(id): Path<UserId>,
    Json(body): Json<BenutzerAendernBody>,
) -> Result<Response, ApiFehler> {
    let rolle = body.role_user.as_deref().map(Rolle::parsen);
    let profil = ProfilUpdate {
        full_name: body.full_name,
        tag: body.tag,
    };
    let benutzer = state
        .auth
        .benutzer_aktualisieren(claims.sub, id, profil, rolle)
        .await?;
    state.melden(Namespace::Users, "updated", &benutzer).await;
    Ok(daten_antwort(StatusCode::OK, benutzer))
}

/// `DELETE /del/:id`
pub async fn delete_user(
    State(state): State<AppState>,
    Verwalter(claims): Verwalter,
    Path(id): Path<UserId>,
) -> Result<Response, ApiFehler> {
    state.auth.benutzer_loeschen(claims.sub, id).await?;
    state
        .melden(Namespace::Users, "deleted", json!({ "user_id": id }))
        .await;
    Ok(daten_antwort(StatusCode::OK, json!({ "user_id": id })))
}
