//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Nur der JWT-Schluessel muss gesetzt werden
//! (Datei oder `KATALOG_JWT_KEY`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use katalog_auth::{AuthKonfig, PasswortKosten};
use katalog_db::DatabaseConfig;
use katalog_realtime::HubKonfig;

/// Umgebungsvariable, die `auth.jwt_schluessel` ueberschreibt
pub const ENV_JWT_KEY: &str = "KATALOG_JWT_KEY";

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerEinstellungen,
    pub datenbank: DatenbankEinstellungen,
    pub auth: AuthEinstellungen,
    pub realtime: RealtimeEinstellungen,
    pub cors: CorsEinstellungen,
    pub logging: LoggingEinstellungen,
}

/// Netzwerk und Lebenszyklus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    pub bind_adresse: String,
    pub port: u16,
    /// Maximale Wartezeit beim Herunterfahren, danach wird hart beendet
    pub shutdown_timeout_sek: u64,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 8080,
            shutdown_timeout_sek: 5,
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    pub sqlite_wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        let standard = DatabaseConfig::default();
        Self {
            url: standard.url,
            max_verbindungen: standard.max_verbindungen,
            sqlite_wal: standard.sqlite_wal,
        }
    }
}

/// Token-Lebensdauern, Cookie und Passwort-Hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// HS256-Schluessel; leer = Start schlaegt fehl
    pub jwt_schluessel: String,
    /// Lebensdauer des Access-Tokens bei Anmeldung
    pub access_ttl_min: i64,
    /// Lebensdauer des Access-Tokens aus `/refresh-token`
    pub access_ttl_refresh_min: i64,
    pub refresh_ttl_tage: i64,
    /// Setzt das `Secure`-Flag am Refresh-Cookie
    pub cookie_secure: bool,
    /// Erlaubte Domain fuer Kontokennungen (z.B. "thientan.com")
    pub konto_domain: Option<String>,
    pub bereinigung_intervall_sek: u64,
    pub argon2_speicher_kib: u32,
    pub argon2_iterationen: u32,
    pub argon2_parallelitaet: u32,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        let kosten = PasswortKosten::default();
        Self {
            jwt_schluessel: String::new(),
            access_ttl_min: 24,
            access_ttl_refresh_min: 15,
            refresh_ttl_tage: 7,
            cookie_secure: false,
            konto_domain: None,
            bereinigung_intervall_sek: 24 * 60 * 60,
            argon2_speicher_kib: kosten.speicher_kib,
            argon2_iterationen: kosten.iterationen,
            argon2_parallelitaet: kosten.parallelitaet,
        }
    }
}

/// Einstellungen des WebSocket-Hubs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeEinstellungen {
    /// Plaetze in der Send-Queue pro Verbindung
    pub sende_queue_groesse: usize,
}

impl Default for RealtimeEinstellungen {
    fn default() -> Self {
        Self {
            sende_queue_groesse: HubKonfig::default().sende_queue_groesse,
        }
    }
}

/// CORS-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsEinstellungen {
    /// Erlaubte Origins (leer = alle erlaubt, nur fuer Entwicklung)
    pub erlaubte_origins: Vec<String>,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei und wendet
    /// `KATALOG_JWT_KEY` an.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        config.jwt_schluessel_ueberschreiben(std::env::var(ENV_JWT_KEY).ok());
        config.pruefen()?;
        Ok(config)
    }

    /// Ersetzt den JWT-Schluessel, sofern ein nicht-leerer Wert vorliegt
    pub fn jwt_schluessel_ueberschreiben(&mut self, wert: Option<String>) {
        if let Some(schluessel) = wert.filter(|s| !s.is_empty()) {
            self.auth.jwt_schluessel = schluessel;
        }
    }

    /// Prueft Werte, fuer die es keinen sinnvollen Standard gibt
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if self.auth.jwt_schluessel.is_empty() {
            anyhow::bail!(
                "Kein JWT-Schluessel konfiguriert (auth.jwt_schluessel oder {ENV_JWT_KEY})"
            );
        }
        if self.auth.access_ttl_min <= 0 || self.auth.access_ttl_refresh_min <= 0 {
            anyhow::bail!("Access-Token-Lebensdauer muss positiv sein");
        }
        if self.auth.refresh_ttl_tage <= 0 {
            anyhow::bail!("Refresh-Token-Lebensdauer muss positiv sein");
        }
        if self.realtime.sende_queue_groesse == 0 {
            anyhow::bail!("realtime.sende_queue_groesse muss mindestens 1 sein");
        }
        Ok(())
    }

    /// Gibt die Bind-Adresse fuer HTTP und WebSocket zurueck
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.server.bind_adresse, self.server.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_sek)
    }

    pub fn bereinigung_intervall(&self) -> Duration {
        Duration::from_secs(self.auth.bereinigung_intervall_sek.max(1))
    }

    pub fn datenbank_konfig(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.sqlite_wal,
        }
    }

    pub fn auth_konfig(&self) -> AuthKonfig {
        AuthKonfig {
            access_ttl: chrono::Duration::minutes(self.auth.access_ttl_min),
            access_ttl_refresh: chrono::Duration::minutes(self.auth.access_ttl_refresh_min),
            refresh_ttl: chrono::Duration::days(self.auth.refresh_ttl_tage),
            konto_domain: self.auth.konto_domain.clone(),
            passwort_kosten: PasswortKosten {
                speicher_kib: self.auth.argon2_speicher_kib,
                iterationen: self.auth.argon2_iterationen,
                parallelitaet: self.auth.argon2_parallelitaet,
            },
        }
    }

    pub fn hub_konfig(&self) -> HubKonfig {
        HubKonfig {
            sende_queue_groesse: self.realtime.sende_queue_groesse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.shutdown_timeout_sek, 5);
        assert_eq!(cfg.auth.access_ttl_min, 24);
        assert_eq!(cfg.auth.access_ttl_refresh_min, 15);
        assert_eq!(cfg.auth.refresh_ttl_tage, 7);
        assert_eq!(cfg.realtime.sende_queue_groesse, 64);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.cors.erlaubte_origins.is_empty());
    }

    #[test]
    fn ohne_schluessel_ungueltig() {
        let cfg = ServerConfig::default();
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn schluessel_aus_umgebung() {
        let mut cfg = ServerConfig::default();
        cfg.jwt_schluessel_ueberschreiben(Some("geheim".into()));
        assert_eq!(cfg.auth.jwt_schluessel, "geheim");
        assert!(cfg.pruefen().is_ok());

        // Leerer Wert ueberschreibt nicht
        cfg.jwt_schluessel_ueberschreiben(Some(String::new()));
        assert_eq!(cfg.auth.jwt_schluessel, "geheim");
        cfg.jwt_schluessel_ueberschreiben(None);
        assert_eq!(cfg.auth.jwt_schluessel, "geheim");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            port = 9000

            [auth]
            jwt_schluessel = "abc"
            access_ttl_min = 30
            konto_domain = "thientan.com"

            [cors]
            erlaubte_origins = ["http://localhost:3000"]
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.bind_adresse(), "0.0.0.0:9000");
        assert_eq!(cfg.auth.access_ttl_min, 30);
        assert_eq!(cfg.cors.erlaubte_origins.len(), 1);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.auth.refresh_ttl_tage, 7);
        assert_eq!(cfg.datenbank.max_verbindungen, 5);

        let auth = cfg.auth_konfig();
        assert_eq!(auth.access_ttl, chrono::Duration::minutes(30));
        assert_eq!(auth.konto_domain.as_deref(), Some("thientan.com"));
    }

    #[test]
    fn fehlende_datei_ergibt_standard() {
        std::env::set_var(ENV_JWT_KEY, "aus-env");
        let cfg = ServerConfig::laden("/nicht/vorhanden/katalog.toml").unwrap();
        assert_eq!(cfg.auth.jwt_schluessel, "aus-env");
        assert_eq!(cfg.server.port, 8080);
    }
}
