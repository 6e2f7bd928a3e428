//! Fehlertypen fuer den Echtzeit-Hub

use thiserror::Error;

/// Fehlertyp fuer den Echtzeit-Hub
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RealtimeError {
    /// Der Hub wurde heruntergefahren, Befehle werden nicht mehr angenommen
    #[error("Hub ist heruntergefahren")]
    HubBeendet,

    /// Nachricht des Clients ist kein gueltiges `{event, data}`-JSON
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),
}

/// Result-Alias fuer den Echtzeit-Hub
pub type RealtimeResult<T> = Result<T, RealtimeError>;
