//! Ereignis-Nachrichten des Echtzeitkanals
//!
//! Alle Nachrichten zwischen Server und WebSocket-Client haben die Form
//! `{"event": <name>, "data": <beliebiges JSON>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Namespace;

/// Name des Client-Befehls zum Beitreten des Namespace-Raums
pub const EVENT_SUBSCRIBE: &str = "subscribe";
/// Bestaetigung nach der Registrierung
pub const EVENT_CONNECTED: &str = "connected";
/// Bestaetigung nach `subscribe`
pub const EVENT_SUBSCRIBED: &str = "subscribed";

/// Eine Nachricht auf dem Echtzeitkanal (in beide Richtungen)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ereignis {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Ereignis {
    /// Erstellt ein Ereignis mit beliebigen Nutzdaten
    pub fn neu(event: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            event: event.into(),
            // Nutzdaten, die sich nicht serialisieren lassen, werden zu `null`
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    /// Domaenen-Ereignis `<domain>:<verb>`, z.B. `location:created`
    pub fn domain(namespace: Namespace, verb: &str, data: impl Serialize) -> Self {
        Self::neu(format!("{}:{verb}", namespace.domain()), data)
    }

    /// Namespace, an dessen Raeume dieses Ereignis zugestellt wird
    pub fn ziel_namespace(&self) -> Option<Namespace> {
        Namespace::aus_ereignis(&self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_ereignis_name() {
        let e = Ereignis::domain(Namespace::Location, "created", json!({"name_local": "Hanoi"}));
        assert_eq!(e.event, "location:created");
        assert_eq!(e.ziel_namespace(), Some(Namespace::Location));
        assert_eq!(e.data["name_local"], "Hanoi");
    }

    #[test]
    fn client_nachricht_ohne_data() {
        let e: Ereignis = serde_json::from_str(r#"{"event":"subscribe"}"#).unwrap();
        assert_eq!(e.event, EVENT_SUBSCRIBE);
        assert_eq!(e.data, Value::Null);
        assert_eq!(e.ziel_namespace(), None);
    }

    #[test]
    fn serialisierung_format() {
        let e = Ereignis::neu(EVENT_CONNECTED, "Connected to /users");
        let text = serde_json::to_string(&e).unwrap();
        assert_eq!(text, r#"{"event":"connected","data":"Connected to /users"}"#);
    }
}
