//! Route-Definitionen
//!
//! REST unter `/katalog/...`, WebSocket unter `/ws/:namespace`,
//! Betrieb unter `/health` und `/metrics`.

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;

use katalog_observability::{health_router, metrics_router, request_timing_layer, timing_middleware};

use crate::http::{handlers, AppState};

/// Erstellt den vollstaendigen Router mit allen Layern
pub fn app_router(state: AppState, cors_origins: &[String]) -> Router {
    let katalog = Router::new()
        .nest("/katalog/users", users_router())
        .nest("/katalog/location", location_router())
        .nest("/katalog/factory", factory_router())
        .nest("/katalog/product", product_router())
        .route("/ws/:namespace", get(handlers::ws::verbinden))
        .route_layer(middleware::from_fn_with_state(
            state.metriken.clone(),
            timing_middleware,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(katalog)
        .merge(health_router(state.clone()))
        .merge(metrics_router(state.metriken.clone()))
        .layer(request_timing_layer())
        .layer(cors_layer(cors_origins))
}

fn users_router() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/sign-up", post(users::sign_up))
        .route("/sign-in", post(users::sign_in))
        .route("/sign-out", post(users::sign_out))
        .route("/refresh-token", post(users::refresh_token))
        .route("/forgot", patch(users::forgot))
        .route("/list", get(users::list))
        .route("/profile", get(users::profile))
        .route("/upd", patch(users::update_self))
        .route("/updPwd", patch(users::update_password))
        .route("/createUser", post(users::create_user))
        .route("/updUser/:id", patch(users::update_user))
        .route("/del/:id", delete(users::delete_user))
}

fn location_router() -> Router<AppState> {
    use handlers::location;

    Router::new()
        .route("/", post(location::create))
        .route("/list", get(location::list))
        .route("/:id", get(location::get))
        .route("/upd/:id", patch(location::update))
        .route("/del/:id", delete(location::delete))
}

fn factory_router() -> Router<AppState> {
    use handlers::factory;

    Router::new()
        .route("/", post(factory::create))
        .route("/list", get(factory::list))
        .route("/list/by-local", get(factory::list_by_local))
        .route("/:id", get(factory::get))
        .route("/upd/:id", patch(factory::update))
        .route("/del/:id", delete(factory::delete))
}

fn product_router() -> Router<AppState> {
    use handlers::product;

    Router::new()
        .route("/", post(product::create))
        .route("/list", get(product::list))
        .route("/list/by-factory", get(product::list_by_factory))
        .route("/:id", get(product::get))
        .route("/upd/:id", patch(product::update))
        .route("/del/:id", delete(product::delete))
}

/// CORS: entweder spezifische Origins (mit Cookies) oder alle (ohne Cookies)
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
