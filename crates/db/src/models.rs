//! Datenbankmodelle fuer Katalog
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank. Die
//! serde-Feldnamen entsprechen dem JSON-Format der REST-Schnittstelle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use katalog_core::{FabrikId, ProduktId, Rolle, StandortId, UserId};

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    #[serde(rename = "user_id")]
    pub id: UserId,
    pub full_name: String,
    pub account: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub tag: String,
    #[serde(rename = "role_user")]
    pub rolle: Rolle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub full_name: &'a str,
    pub account: &'a str,
    pub password_hash: &'a str,
    pub tag: &'a str,
    pub rolle: Rolle,
}

/// Daten zum Aktualisieren eines Benutzers
#[derive(Debug, Clone, Default)]
pub struct BenutzerUpdate {
    pub full_name: Option<String>,
    pub tag: Option<String>,
    pub rolle: Option<Rolle>,
    pub password_hash: Option<String>,
}

// ---------------------------------------------------------------------------
// Refresh-Tokens
// ---------------------------------------------------------------------------

/// Persistierter Refresh-Token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Abgelaufen erst, wenn `expires_at` echt in der Vergangenheit liegt
    pub fn ist_abgelaufen(&self, jetzt: DateTime<Utc>) -> bool {
        self.expires_at < jetzt
    }

    /// Weder widerrufen noch abgelaufen
    pub fn ist_aktiv(&self, jetzt: DateTime<Utc>) -> bool {
        !self.revoked && !self.ist_abgelaufen(jetzt)
    }
}

/// Daten zum Speichern eines neuen Refresh-Tokens
#[derive(Debug, Clone)]
pub struct NeuerRefreshToken<'a> {
    pub token: &'a str,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Standorte
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandortRecord {
    #[serde(rename = "location_id")]
    pub id: StandortId,
    pub name_local: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Fabriken
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FabrikRecord {
    #[serde(rename = "factory_id")]
    pub id: FabrikId,
    pub name_factory: String,
    pub location_id: StandortId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NeueFabrik<'a> {
    pub name_factory: &'a str,
    pub location_id: StandortId,
}

#[derive(Debug, Clone, Default)]
pub struct FabrikUpdate {
    pub name_factory: Option<String>,
    pub location_id: Option<StandortId>,
}

// ---------------------------------------------------------------------------
// Produkte
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProduktRecord {
    #[serde(rename = "product_id")]
    pub id: ProduktId,
    pub title: String,
    pub image: String,
    pub video: Option<String>,
    pub status: String,
    pub describe_product: String,
    pub year_product: NaiveDate,
    pub factory_id: FabrikId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NeuesProdukt<'a> {
    pub title: &'a str,
    pub image: &'a str,
    pub video: Option<&'a str>,
    pub status: &'a str,
    pub describe_product: &'a str,
    pub year_product: NaiveDate,
    pub factory_id: FabrikId,
}

#[derive(Debug, Clone, Default)]
pub struct ProduktUpdate {
    pub title: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub status: Option<String>,
    pub describe_product: Option<String>,
    pub year_product: Option<NaiveDate>,
    pub factory_id: Option<FabrikId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(revoked: bool, ablauf: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            token: "t".into(),
            user_id: UserId::new(),
            expires_at: ablauf,
            revoked,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn refresh_token_status() {
        let jetzt = Utc::now();
        assert!(record(false, jetzt + Duration::hours(1)).ist_aktiv(jetzt));
        assert!(!record(true, jetzt + Duration::hours(1)).ist_aktiv(jetzt));
        assert!(record(false, jetzt - Duration::seconds(1)).ist_abgelaufen(jetzt));
        assert!(!record(false, jetzt - Duration::seconds(1)).ist_aktiv(jetzt));
    }

    #[test]
    fn ablauf_genau_jetzt_ist_noch_gueltig() {
        let jetzt = Utc::now();
        let r = record(false, jetzt);
        assert!(!r.ist_abgelaufen(jetzt));
        assert!(r.ist_aktiv(jetzt));
        assert!(r.ist_abgelaufen(jetzt + Duration::milliseconds(1)));
    }

    #[test]
    fn benutzer_json_ohne_passwort_hash() {
        let jetzt = Utc::now();
        let b = BenutzerRecord {
            id: UserId::new(),
            full_name: "Nguyen Van A".into(),
            account: "a@thientan.com".into(),
            password_hash: "$argon2id$geheim".into(),
            tag: "sales".into(),
            rolle: Rolle::Admin,
            created_at: jetzt,
            updated_at: jetzt,
        };
        let json = serde_json_wert(&b);
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role_user"], "ADMIN");
        assert_eq!(json["user_id"], b.id.to_string());
    }

    fn serde_json_wert<T: Serialize>(t: &T) -> serde_json::Value {
        serde_json::to_value(t).unwrap()
    }
}
