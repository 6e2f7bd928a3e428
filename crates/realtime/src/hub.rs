//! Echtzeit-Hub – Verbindungsregister, Raeume und Broadcast
//!
//! Der Hub laeuft als einzelner tokio-Task (Actor). Der [`Hub`]-Handle ist
//! billig zu klonen und schickt Befehle ueber eine mpsc-Queue. Register
//! und Raeume gehoeren exklusiv dem Actor; es gibt keine geteilten Maps.
//!
//! ## Raeume
//! - `/<ns>` – Standard-Raum, jede Verbindung bei der Registrierung
//! - `/<ns>:<ns>-room` – Abo-Raum, Beitritt per `subscribe`
//!
//! Ein Ereignis `<domain>:<verb>` geht an alle Raeume mit Praefix
//! `/<domain>:`. Der Standard-Raum erhaelt keine Domaenen-Ereignisse.
//!
//! ## Zustellung
//! Pro Verbindung nicht-blockierend via `try_send`. Ist die Queue voll oder
//! geschlossen, wird die Verbindung abgemeldet. Keine Wiederholung.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use katalog_core::event::{EVENT_CONNECTED, EVENT_SUBSCRIBED};
use katalog_core::{Ereignis, Namespace, Rolle, UserId};
use katalog_observability::KatalogMetriken;

use crate::error::{RealtimeError, RealtimeResult};

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Standardgroesse der Send-Queue pro Verbindung
pub const SENDE_QUEUE_GROESSE: usize = 64;

/// Groesse der Befehls-Queue des Actors
const BEFEHLS_QUEUE_GROESSE: usize = 1024;

#[derive(Debug, Clone)]
pub struct HubKonfig {
    pub sende_queue_groesse: usize,
}

impl Default for HubKonfig {
    fn default() -> Self {
        Self {
            sende_queue_groesse: SENDE_QUEUE_GROESSE,
        }
    }
}

// ---------------------------------------------------------------------------
// Oeffentliche Typen
// ---------------------------------------------------------------------------

/// Prozessweit eindeutige Kennung einer Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerbindungsId(u64);

impl fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identitaet einer Verbindung, abgeleitet aus einem geprueften Access-Token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identitaet {
    pub user_id: UserId,
    pub rolle: Rolle,
    pub namespace: Namespace,
}

/// Ergebnis einer Registrierung
///
/// Der Empfaenger liefert `None`, sobald der Hub die Verbindung abmeldet.
#[derive(Debug)]
pub struct Registrierung {
    pub id: VerbindungsId,
    pub empfaenger: mpsc::Receiver<Ereignis>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStatistik {
    pub verbindungen: usize,
    pub raeume: usize,
}

// ---------------------------------------------------------------------------
// Hub-Handle
// ---------------------------------------------------------------------------

enum Befehl {
    Registrieren {
        id: VerbindungsId,
        identitaet: Identitaet,
        tx: mpsc::Sender<Ereignis>,
    },
    Abmelden {
        id: VerbindungsId,
    },
    Abonnieren {
        id: VerbindungsId,
    },
    Broadcast {
        ereignis: Ereignis,
    },
    Statistik {
        antwort: oneshot::Sender<HubStatistik>,
    },
    RaumMitglieder {
        raum: String,
        antwort: oneshot::Sender<Vec<VerbindungsId>>,
    },
    Herunterfahren {
        antwort: oneshot::Sender<()>,
    },
}

/// Handle auf den Hub-Actor
///
/// Nach dem Herunterfahren sind alle Operationen wirkungslos.
#[derive(Clone)]
pub struct Hub {
    befehle: mpsc::Sender<Befehl>,
    naechste_id: Arc<AtomicU64>,
    sende_queue_groesse: usize,
}

impl Hub {
    /// Startet den Actor-Task und gibt Handle und JoinHandle zurueck
    pub fn starten(konfig: HubKonfig, metriken: KatalogMetriken) -> (Self, JoinHandle<()>) {
        let (befehle, rx) = mpsc::channel(BEFEHLS_QUEUE_GROESSE);
        let actor = HubActor {
            verbindungen: HashMap::new(),
            raeume: HashMap::new(),
            metriken,
        };
        let task = tokio::spawn(actor.ausfuehren(rx));

        tracing::info!(
            sende_queue = konfig.sende_queue_groesse,
            "Echtzeit-Hub gestartet"
        );

        let hub = Self {
            befehle,
            naechste_id: Arc::new(AtomicU64::new(1)),
            sende_queue_groesse: konfig.sende_queue_groesse.max(1),
        };
        (hub, task)
    }

    /// Nimmt eine Verbindung auf und ordnet sie dem Standard-Raum zu
    ///
    /// Die erste Nachricht im Empfaenger ist `connected`.
    pub async fn registrieren(&self, identitaet: Identitaet) -> RealtimeResult<Registrierung> {
        let id = VerbindungsId(self.naechste_id.fetch_add(1, Ordering::Relaxed));
        let (tx, empfaenger) = mpsc::channel(self.sende_queue_groesse);
        self.senden(Befehl::Registrieren { id, identitaet, tx }).await?;
        Ok(Registrierung { id, empfaenger })
    }

    /// Entfernt die Verbindung aus allen Raeumen; idempotent
    pub async fn abmelden(&self, id: VerbindungsId) {
        let _ = self.senden(Befehl::Abmelden { id }).await;
    }

    /// Tritt dem Abo-Raum des eigenen Namespaces bei
    pub async fn abonnieren(&self, id: VerbindungsId) -> RealtimeResult<()> {
        self.senden(Befehl::Abonnieren { id }).await
    }

    /// Verteilt ein Domaenen-Ereignis (fire-and-forget)
    pub async fn broadcast(&self, ereignis: Ereignis) {
        let event = ereignis.event.clone();
        if self.senden(Befehl::Broadcast { ereignis }).await.is_err() {
            tracing::debug!(event = %event, "Broadcast nach Hub-Ende verworfen");
        }
    }

    /// Anzahl Verbindungen und Raeume; leer nach dem Herunterfahren
    pub async fn statistik(&self) -> HubStatistik {
        let (antwort, rx) = oneshot::channel();
        if self.senden(Befehl::Statistik { antwort }).await.is_err() {
            return HubStatistik::default();
        }
        rx.await.unwrap_or_default()
    }

    /// Mitglieder eines Raums in aufsteigender Reihenfolge
    pub async fn raum_mitglieder(&self, raum: &str) -> Vec<VerbindungsId> {
        let (antwort, rx) = oneshot::channel();
        let befehl = Befehl::RaumMitglieder {
            raum: raum.to_string(),
            antwort,
        };
        if self.senden(befehl).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Schliesst alle Verbindungen und beendet den Actor
    pub async fn herunterfahren(&self) {
        let (antwort, rx) = oneshot::channel();
        if self.senden(Befehl::Herunterfahren { antwort }).await.is_ok() {
            let _ = rx.await;
        }
    }

    async fn senden(&self, befehl: Befehl) -> RealtimeResult<()> {
        self.befehle
            .send(befehl)
            .await
            .map_err(|_| RealtimeError::HubBeendet)
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct VerbindungsEintrag {
    identitaet: Identitaet,
    tx: mpsc::Sender<Ereignis>,
    raeume: HashSet<String>,
}

struct HubActor {
    verbindungen: HashMap<VerbindungsId, VerbindungsEintrag>,
    raeume: HashMap<String, HashSet<VerbindungsId>>,
    metriken: KatalogMetriken,
}

impl HubActor {
    async fn ausfuehren(mut self, mut befehle: mpsc::Receiver<Befehl>) {
        let mut bestaetigung = None;

        while let Some(befehl) = befehle.recv().await {
            match befehl {
                Befehl::Herunterfahren { antwort } => {
                    bestaetigung = Some(antwort);
                    break;
                }
                andere => self.verarbeiten(andere),
            }
        }

        // Weitere Befehle werden ab hier abgelehnt
        befehle.close();
        let anzahl = self.verbindungen.len();
        self.alles_schliessen();
        tracing::info!(verbindungen = anzahl, "Echtzeit-Hub heruntergefahren");

        if let Some(antwort) = bestaetigung {
            let _ = antwort.send(());
        }
    }

    fn verarbeiten(&mut self, befehl: Befehl) {
        match befehl {
            Befehl::Registrieren { id, identitaet, tx } => self.registrieren(id, identitaet, tx),
            Befehl::Abmelden { id } => {
                if self.entfernen(id) {
                    tracing::debug!(verbindung = %id, "Verbindung abgemeldet");
                }
            }
            Befehl::Abonnieren { id } => self.abonnieren(id),
            Befehl::Broadcast { ereignis } => self.broadcast(ereignis),
            Befehl::Statistik { antwort } => {
                let _ = antwort.send(HubStatistik {
                    verbindungen: self.verbindungen.len(),
                    raeume: self.raeume.len(),
                });
            }
            Befehl::RaumMitglieder { raum, antwort } => {
                let mut mitglieder: Vec<VerbindungsId> = self
                    .raeume
                    .get(&raum)
                    .map(|m| m.iter().copied().collect())
                    .unwrap_or_default();
                mitglieder.sort();
                let _ = antwort.send(mitglieder);
            }
            // Wird in `ausfuehren` behandelt
            Befehl::Herunterfahren { .. } => {}
        }
    }

    fn registrieren(&mut self, id: VerbindungsId, identitaet: Identitaet, tx: mpsc::Sender<Ereignis>) {
        let raum = identitaet.namespace.standard_raum();

        self.raeume.entry(raum.clone()).or_default().insert(id);
        self.verbindungen.insert(
            id,
            VerbindungsEintrag {
                identitaet,
                tx,
                raeume: HashSet::from([raum]),
            },
        );
        self.metriken
            .ws_verbindungen
            .set(self.verbindungen.len() as i64);

        tracing::info!(
            verbindung = %id,
            user_id = %identitaet.user_id,
            namespace = %identitaet.namespace,
            "Verbindung registriert"
        );

        let bestaetigung = Ereignis::neu(
            EVENT_CONNECTED,
            format!("Connected to {}", identitaet.namespace.pfad()),
        );
        self.zustellen(id, bestaetigung);
    }

    fn abonnieren(&mut self, id: VerbindungsId) {
        let Some(eintrag) = self.verbindungen.get_mut(&id) else {
            tracing::debug!(verbindung = %id, "subscribe fuer unbekannte Verbindung");
            return;
        };

        let raum = eintrag.identitaet.namespace.abo_raum();
        eintrag.raeume.insert(raum.clone());
        self.raeume.entry(raum.clone()).or_default().insert(id);

        tracing::debug!(verbindung = %id, raum = %raum, "Raum beigetreten");

        self.zustellen(id, Ereignis::neu(EVENT_SUBSCRIBED, format!("Subscribed to {raum}")));
    }

    fn broadcast(&mut self, ereignis: Ereignis) {
        let Some(namespace) = ereignis.ziel_namespace() else {
            tracing::debug!(event = %ereignis.event, "Ereignis ohne bekannte Domaene verworfen");
            return;
        };
        let praefix = namespace.raum_praefix();

        let mut empfaenger: Vec<VerbindungsId> = self
            .raeume
            .iter()
            .filter(|(name, _)| name.starts_with(&praefix))
            .flat_map(|(_, mitglieder)| mitglieder.iter().copied())
            .collect();
        // Mitglied mehrerer passender Raeume erhaelt das Ereignis nur einmal
        empfaenger.sort();
        empfaenger.dedup();

        self.metriken.broadcasts_total.inc();

        let mut zugestellt = 0u64;
        let mut verworfen = Vec::new();
        for id in empfaenger {
            let Some(eintrag) = self.verbindungen.get(&id) else {
                continue;
            };
            match eintrag.tx.try_send(ereignis.clone()) {
                Ok(()) => zugestellt += 1,
                Err(e) => {
                    queue_fehler_loggen(id, &e);
                    verworfen.push(id);
                }
            }
        }

        for id in &verworfen {
            self.entfernen(*id);
        }
        self.metriken.zustellungen_total.inc_by(zugestellt);
        self.metriken
            .verbindungen_verworfen_total
            .inc_by(verworfen.len() as u64);

        tracing::debug!(
            event = %ereignis.event,
            zugestellt,
            verworfen = verworfen.len(),
            "Ereignis verteilt"
        );
    }

    /// Reiht ein Ereignis fuer eine Verbindung ein; bei Fehler wird sie entfernt
    fn zustellen(&mut self, id: VerbindungsId, ereignis: Ereignis) {
        let Some(eintrag) = self.verbindungen.get(&id) else {
            return;
        };
        match eintrag.tx.try_send(ereignis) {
            Ok(()) => self.metriken.zustellungen_total.inc(),
            Err(e) => {
                queue_fehler_loggen(id, &e);
                self.metriken.verbindungen_verworfen_total.inc();
                self.entfernen(id);
            }
        }
    }

    /// Entfernt eine Verbindung; leere Raeume werden geloescht.
    /// Mit dem Eintrag faellt der Sender weg und die Queue schliesst.
    fn entfernen(&mut self, id: VerbindungsId) -> bool {
        let Some(eintrag) = self.verbindungen.remove(&id) else {
            return false;
        };

        for raum in &eintrag.raeume {
            if let Some(mitglieder) = self.raeume.get_mut(raum) {
                mitglieder.remove(&id);
                if mitglieder.is_empty() {
                    self.raeume.remove(raum);
                }
            }
        }

        self.metriken
            .ws_verbindungen
            .set(self.verbindungen.len() as i64);
        true
    }

    fn alles_schliessen(&mut self) {
        self.verbindungen.clear();
        self.raeume.clear();
        self.metriken.ws_verbindungen.set(0);
    }
}

fn queue_fehler_loggen(id: VerbindungsId, fehler: &mpsc::error::TrySendError<Ereignis>) {
    match fehler {
        mpsc::error::TrySendError::Full(_) => {
            tracing::warn!(verbindung = %id, "Send-Queue voll – Verbindung wird getrennt");
        }
        mpsc::error::TrySendError::Closed(_) => {
            tracing::debug!(verbindung = %id, "Send-Queue geschlossen (Client getrennt)");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
