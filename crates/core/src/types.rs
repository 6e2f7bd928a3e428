//! Gemeinsame Identifikations- und Domaenentypen fuer Katalog
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KatalogError;

macro_rules! id_typ {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Erstellt eine neue zufaellige ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Gibt die innere UUID zurueck
            pub fn inner(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = KatalogError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| KatalogError::UngueltigeId(s.to_string()))
            }
        }
    };
}

id_typ!(
    /// Eindeutige Benutzer-ID
    UserId
);
id_typ!(
    /// Eindeutige Standort-ID
    StandortId
);
id_typ!(
    /// Eindeutige Fabrik-ID
    FabrikId
);
id_typ!(
    /// Eindeutige Produkt-ID
    ProduktId
);

// ---------------------------------------------------------------------------
// Rolle
// ---------------------------------------------------------------------------

/// Rolle eines Benutzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rolle {
    #[default]
    User,
    Admin,
    Root,
}

impl Rolle {
    /// Parst eine Rolle ohne Beachtung der Gross-/Kleinschreibung.
    ///
    /// Unbekannte Werte werden zu `User`.
    pub fn parsen(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "ROOT" => Self::Root,
            _ => Self::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Root => "ROOT",
        }
    }

    /// ADMIN oder ROOT
    pub fn ist_verwalter(&self) -> bool {
        matches!(self, Self::Admin | Self::Root)
    }
}

impl fmt::Display for Rolle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Namespace
// ---------------------------------------------------------------------------

/// Verbindungskategorie einer WebSocket-Verbindung
///
/// Jeder Namespace entspricht einer Domaene; Raeume und Ereignisse sind
/// nach Namespace getrennt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Users,
    Product,
    Factory,
    Location,
}

impl Namespace {
    pub const ALLE: [Namespace; 4] = [
        Namespace::Users,
        Namespace::Product,
        Namespace::Factory,
        Namespace::Location,
    ];

    /// Domaenenname, gleichzeitig Praefix der Ereignisnamen (`product`)
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Product => "product",
            Self::Factory => "factory",
            Self::Location => "location",
        }
    }

    /// Pfad des Namespaces (`/product`), zugleich Name des Standard-Raums
    pub fn pfad(&self) -> String {
        format!("/{}", self.domain())
    }

    /// Raum, dem jede Verbindung bei der Registrierung zugeordnet wird
    pub fn standard_raum(&self) -> String {
        self.pfad()
    }

    /// Raum, dem eine Verbindung per `subscribe` beitritt (`/product:product-room`)
    pub fn abo_raum(&self) -> String {
        format!("/{0}:{0}-room", self.domain())
    }

    /// Praefix aller Raeume, die Domaenen-Ereignisse dieses Namespaces erhalten
    pub fn raum_praefix(&self) -> String {
        format!("/{}:", self.domain())
    }

    /// Bestimmt den Namespace eines Ereignisses anhand seines Praefixes.
    ///
    /// `factory:created` → `Factory`. Ereignisse ohne `:` oder mit
    /// unbekannter Domaene ergeben `None`.
    pub fn aus_ereignis(event: &str) -> Option<Self> {
        let (domain, verb) = event.split_once(':')?;
        if verb.is_empty() {
            return None;
        }
        domain.parse().ok()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.domain())
    }
}

impl FromStr for Namespace {
    type Err = KatalogError;

    /// Akzeptiert `product` und `/product`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('/') {
            "users" => Ok(Self::Users),
            "product" => Ok(Self::Product),
            "factory" => Ok(Self::Factory),
            "location" => Ok(Self::Location),
            _ => Err(KatalogError::UnbekannterNamespace(s.to_string())),
        }
    }
}
