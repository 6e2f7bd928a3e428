//! Axum-Handler, gruppiert nach Ressource

pub mod factory;
pub mod location;
pub mod product;
pub mod users;
pub mod ws;
