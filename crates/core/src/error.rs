//! Fehlertypen fuer Katalog
//!
//! Gemeinsame Fehler fuer Parsing und Validierung der Kerntypen.
//! Untermodule definieren eigene Fehler und konvertieren via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer Katalog
pub type Result<T> = std::result::Result<T, KatalogError>;

/// Fehler der Kerntypen
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KatalogError {
    #[error("Unbekannter Namespace: {0}")]
    UnbekannterNamespace(String),

    #[error("Ungueltige ID: {0}")]
    UngueltigeId(String),

    #[error("Ungueltiger Ereignisname: {0}")]
    UngueltigerEreignisname(String),
}
