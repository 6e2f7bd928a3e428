//! katalog-core – Gemeinsame Typen, Rollen und Ereignisse
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Katalog-Crates gemeinsam genutzt werden.

pub mod error;
pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{KatalogError, Result};
pub use event::Ereignis;
pub use types::{FabrikId, Namespace, ProduktId, Rolle, StandortId, UserId};
