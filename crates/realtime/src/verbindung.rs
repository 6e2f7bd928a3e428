//! WebSocket-Sitzung – verbindet einen Client mit dem Hub
//!
//! Pro Verbindung laufen zwei Tasks:
//! - Leser: dekodiert `{event, data}`-Nachrichten, leitet `subscribe` an den Hub
//! - Schreiber: leert die Send-Queue der Verbindung in den Socket
//!
//! Endet einer der beiden, wird der andere abgebrochen und die Verbindung
//! beim Hub abgemeldet. Die Authentifizierung erfolgt vor dem Upgrade.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::mpsc;

use katalog_core::{event::EVENT_SUBSCRIBE, Ereignis};

use crate::error::{RealtimeError, RealtimeResult};
use crate::hub::{Hub, Identitaet, VerbindungsId};

/// Fuehrt eine WebSocket-Sitzung bis zum Verbindungsende
pub async fn sitzung_fuehren(socket: WebSocket, hub: Hub, identitaet: Identitaet) {
    let registrierung = match hub.registrieren(identitaet).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(user_id = %identitaet.user_id, fehler = %e, "Registrierung abgelehnt");
            return;
        }
    };
    let id = registrierung.id;
    let (sink, stream) = socket.split();

    let mut schreiber = tokio::spawn(schreiben(sink, registrierung.empfaenger, id));
    let mut leser = tokio::spawn(lesen(stream, hub.clone(), id));

    tokio::select! {
        _ = &mut schreiber => leser.abort(),
        _ = &mut leser => schreiber.abort(),
    }

    hub.abmelden(id).await;
    tracing::info!(verbindung = %id, user_id = %identitaet.user_id, "Verbindung beendet");
}

async fn schreiben(
    mut sink: SplitSink<WebSocket, Message>,
    mut empfaenger: mpsc::Receiver<Ereignis>,
    id: VerbindungsId,
) {
    while let Some(ereignis) = empfaenger.recv().await {
        let text = match serde_json::to_string(&ereignis) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(verbindung = %id, fehler = %e, "Ereignis nicht serialisierbar");
                continue;
            }
        };
        if let Err(e) = sink.send(Message::Text(text)).await {
            tracing::debug!(verbindung = %id, fehler = %e, "Senden fehlgeschlagen");
            return;
        }
    }

    // Queue geschlossen: Hub hat die Verbindung abgemeldet
    let _ = sink.send(Message::Close(None)).await;
}

async fn lesen(mut stream: SplitStream<WebSocket>, hub: Hub, id: VerbindungsId) {
    while let Some(nachricht) = stream.next().await {
        let text = match nachricht {
            Ok(Message::Text(t)) => t,
            Ok(Message::Binary(daten)) => match String::from_utf8(daten) {
                Ok(t) => t,
                Err(_) => {
                    tracing::debug!(verbindung = %id, "Binaerframe ohne UTF-8 ignoriert");
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            // Pong beantwortet axum selbst
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Err(e) => {
                tracing::debug!(verbindung = %id, fehler = %e, "Lesefehler");
                break;
            }
        };

        match nachricht_dekodieren(&text) {
            Ok(ereignis) if ereignis.event == EVENT_SUBSCRIBE => {
                if hub.abonnieren(id).await.is_err() {
                    break;
                }
            }
            Ok(ereignis) => {
                tracing::debug!(verbindung = %id, event = %ereignis.event, "Unbekannter Client-Befehl");
            }
            Err(e) => {
                tracing::warn!(verbindung = %id, fehler = %e, "Nachricht ignoriert");
            }
        }
    }
}

/// Dekodiert eine Client-Nachricht `{event, data}`
pub fn nachricht_dekodieren(text: &str) -> RealtimeResult<Ereignis> {
    serde_json::from_str(text).map_err(|e| RealtimeError::UngueltigeNachricht(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_dekodieren() {
        let e = nachricht_dekodieren(r#"{"event":"subscribe"}"#).unwrap();
        assert_eq!(e.event, EVENT_SUBSCRIBE);

        let e = nachricht_dekodieren(r#"{"event":"subscribe","data":{"room":"x"}}"#).unwrap();
        assert_eq!(e.data["room"], "x");
    }

    #[test]
    fn kaputtes_json() {
        assert!(matches!(
            nachricht_dekodieren("subscribe"),
            Err(RealtimeError::UngueltigeNachricht(_))
        ));
        assert!(nachricht_dekodieren(r#"{"data":1}"#).is_err());
    }
}
