//! katalog-realtime – Echtzeit-Hub fuer Domaenen-Ereignisse
//!
//! Der [`Hub`] ist ein einzelner Actor-Task, der Verbindungsregister und
//! Raum-Mitgliedschaften besitzt. Alle Zugriffe laufen ueber eine
//! Befehls-Queue und werden strikt nacheinander verarbeitet.
//! [`verbindung`] verbindet einen WebSocket mit dem Hub.

pub mod error;
pub mod hub;
pub mod verbindung;

pub use error::{RealtimeError, RealtimeResult};
pub use hub::{Hub, HubKonfig, HubStatistik, Identitaet, Registrierung, VerbindungsId};
pub use verbindung::sitzung_fuehren;
