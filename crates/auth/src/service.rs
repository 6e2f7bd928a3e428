//! Auth-Service fuer Katalog
//!
//! Zentraler Service fuer Registrierung, Anmeldung, Token-Erneuerung,
//! Abmeldung und Passwortverwaltung. Access-Tokens sind zustandslos;
//! Refresh-Tokens werden zusaetzlich im Refresh-Token-Store gefuehrt.
//! Pro Benutzer ist hoechstens ein Refresh-Token aktiv.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, Utc};

use katalog_core::{Rolle, UserId};
use katalog_db::{
    models::{BenutzerRecord, BenutzerUpdate, NeuerBenutzer, NeuerRefreshToken, RefreshTokenRecord},
    repository::{RefreshTokenRepository, UserRepository},
    DbError,
};

use crate::{
    error::{AuthError, AuthResult},
    password::{
        konto_pruefen, passwort_hashen, passwort_richtlinie_pruefen, passwort_verifizieren,
        PasswortKosten,
    },
    rechte,
    token::{AusgestellterToken, Claims, TokenArt, TokenCodec, TokenFehler},
};

/// Laufzeiten und Richtlinien des Auth-Service
#[derive(Debug, Clone)]
pub struct AuthKonfig {
    /// Access-Token bei Registrierung und Anmeldung
    pub access_ttl: Duration,
    /// Access-Token, der ueber einen Refresh-Token erneuert wurde
    pub access_ttl_refresh: Duration,
    pub refresh_ttl: Duration,
    /// Erlaubte Domain der Kontokennung (`thientan.com`); `None` erlaubt alle
    pub konto_domain: Option<String>,
    pub passwort_kosten: PasswortKosten,
}

impl Default for AuthKonfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(24),
            access_ttl_refresh: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            konto_domain: None,
            passwort_kosten: PasswortKosten::default(),
        }
    }
}

/// Access- und Refresh-Token einer Sitzung
#[derive(Debug, Clone)]
pub struct TokenPaar {
    pub access_token: String,
    pub access_laeuft_ab: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_laeuft_ab: DateTime<Utc>,
}

/// Ergebnis einer erfolgreichen Anmeldung
#[derive(Debug, Clone)]
pub struct Anmeldung {
    pub benutzer: BenutzerRecord,
    pub tokens: TokenPaar,
    /// `true`, wenn der vorhandene Refresh-Token weiterverwendet wurde
    pub refresh_wiederverwendet: bool,
}

/// Ergebnis einer Token-Erneuerung
#[derive(Debug, Clone)]
pub struct ErneuerterZugang {
    pub access_token: String,
    pub laeuft_ab_am: DateTime<Utc>,
    pub user_id: UserId,
    pub rolle: Rolle,
}

/// Eingabedaten fuer ein neues Konto
#[derive(Debug, Clone, Copy)]
pub struct Registrierung<'a> {
    pub full_name: &'a str,
    pub account: &'a str,
    pub passwort: &'a str,
    pub tag: &'a str,
}

/// Aenderbare Profilfelder
#[derive(Debug, Clone, Default)]
pub struct ProfilUpdate {
    pub full_name: Option<String>,
    pub tag: Option<String>,
}

/// Auth-Service – zentraler Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<U: UserRepository, R: RefreshTokenRepository> {
    user_repo: Arc<U>,
    token_repo: Arc<R>,
    codec: Arc<TokenCodec>,
    konfig: AuthKonfig,
    /// Hash eines Zufallspassworts fuer Anmeldungen mit unbekanntem Konto
    attrappe: OnceLock<String>,
}

impl<U: UserRepository, R: RefreshTokenRepository> AuthService<U, R> {
    /// Erstellt einen neuen AuthService
    pub fn neu(
        user_repo: Arc<U>,
        token_repo: Arc<R>,
        codec: Arc<TokenCodec>,
        konfig: AuthKonfig,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            codec,
            konfig,
            attrappe: OnceLock::new(),
        }
    }

    pub fn konfig(&self) -> &AuthKonfig {
        &self.konfig
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    // -----------------------------------------------------------------------
    // Sitzungslebenszyklus
    // -----------------------------------------------------------------------

    /// Registriert ein neues Konto (Rolle USER) und eroeffnet eine Sitzung
    pub async fn registrieren(
        &self,
        daten: Registrierung<'_>,
    ) -> AuthResult<(BenutzerRecord, TokenPaar)> {
        let benutzer = self.konto_anlegen(daten, Rolle::User).await?;

        let access = self.access_ausstellen(&benutzer, self.konfig.access_ttl)?;
        let refresh = self.refresh_ausstellen(&benutzer)?;
        self.token_repo
            .create(NeuerRefreshToken {
                token: &refresh.token,
                user_id: benutzer.id,
                expires_at: refresh.laeuft_ab_am(),
            })
            .await?;

        tracing::info!(
            user_id = %benutzer.id,
            account = %benutzer.account,
            "Neues Konto registriert"
        );

        Ok((benutzer, token_paar(access, refresh)))
    }

    /// Meldet einen Benutzer an
    ///
    /// Gehoert `vorhandener_refresh` zum selben Benutzer und ist im Store
    /// noch aktiv, wird er weiterverwendet und nur ein neuer Access-Token
    /// ausgestellt. Andernfalls werden alle Refresh-Tokens des Benutzers
    /// widerrufen und ein neues Paar ausgestellt.
    pub async fn anmelden(
        &self,
        account: &str,
        passwort: &str,
        vorhandener_refresh: Option<&str>,
    ) -> AuthResult<Anmeldung> {
        if account.trim().is_empty() || passwort.is_empty() {
            return Err(AuthError::eingabe("Konto und Passwort sind erforderlich"));
        }

        let Some(benutzer) = self.user_repo.get_by_account(account).await? else {
            // Gleicher Argon2-Aufwand wie bei falschem Passwort
            let _ = passwort_verifizieren(passwort, self.attrappen_hash());
            tracing::warn!(account = %account, "Anmeldeversuch mit unbekanntem Konto");
            return Err(AuthError::UngueltigeAnmeldedaten);
        };

        if !passwort_verifizieren(passwort, &benutzer.password_hash)? {
            tracing::warn!(account = %account, "Fehlgeschlagener Anmeldeversuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let access = self.access_ausstellen(&benutzer, self.konfig.access_ttl)?;

        if let Some(alt) = vorhandener_refresh {
            if let Some(record) = self.wiederverwendbarer_refresh(alt, benutzer.id).await? {
                tracing::info!(user_id = %benutzer.id, "Angemeldet, Refresh-Token weiterverwendet");
                let tokens = TokenPaar {
                    access_token: access.token.clone(),
                    access_laeuft_ab: access.laeuft_ab_am(),
                    refresh_token: record.token,
                    refresh_laeuft_ab: record.expires_at,
                };
                return Ok(Anmeldung {
                    benutzer,
                    tokens,
                    refresh_wiederverwendet: true,
                });
            }
        }

        let refresh = self.refresh_ausstellen(&benutzer)?;
        self.token_repo
            .ersetzen_fuer_benutzer(NeuerRefreshToken {
                token: &refresh.token,
                user_id: benutzer.id,
                expires_at: refresh.laeuft_ab_am(),
            })
            .await?;

        tracing::info!(user_id = %benutzer.id, "Angemeldet, neue Sitzung");

        Ok(Anmeldung {
            benutzer,
            tokens: token_paar(access, refresh),
            refresh_wiederverwendet: false,
        })
    }

    /// Stellt mit einem Refresh-Token einen neuen Access-Token aus
    ///
    /// Der Refresh-Token selbst wird nicht rotiert.
    pub async fn access_erneuern(&self, refresh_token: &str) -> AuthResult<ErneuerterZugang> {
        let claims = self.codec.pruefen_als(refresh_token, TokenArt::Refresh)?;

        let record = self
            .token_repo
            .get_by_token(refresh_token)
            .await?
            .ok_or(AuthError::TokenWiderrufen)?;

        if record.revoked {
            return Err(AuthError::TokenWiderrufen);
        }
        if record.ist_abgelaufen(Utc::now()) {
            return Err(AuthError::TokenAbgelaufen);
        }
        if record.user_id != claims.sub {
            return Err(AuthError::Token(TokenFehler::Fehlerhaft(
                "Subjekt passt nicht zum gespeicherten Token".into(),
            )));
        }

        let access = self
            .codec
            .ausstellen(
                claims.sub,
                claims.role,
                TokenArt::Access,
                self.konfig.access_ttl_refresh,
            )?;

        tracing::debug!(user_id = %claims.sub, "Access-Token erneuert");

        Ok(ErneuerterZugang {
            laeuft_ab_am: access.laeuft_ab_am(),
            access_token: access.token,
            user_id: claims.sub,
            rolle: claims.role,
        })
    }

    /// Loescht den Refresh-Token; `true` wenn ein Datensatz entfernt wurde
    pub async fn abmelden(&self, refresh_token: &str) -> AuthResult<bool> {
        let geloescht = self.token_repo.delete_by_token(refresh_token).await?;
        tracing::debug!(geloescht, "Abmeldung");
        Ok(geloescht)
    }

    /// Prueft einen Access-Token (zustandslos); Refresh-Tokens werden abgelehnt
    pub fn access_pruefen(&self, token: &str) -> AuthResult<Claims> {
        Ok(self.codec.pruefen_als(token, TokenArt::Access)?)
    }

    // -----------------------------------------------------------------------
    // Passwoerter
    // -----------------------------------------------------------------------

    /// Aendert das Passwort; das aktuelle Passwort muss stimmen
    pub async fn passwort_aendern(
        &self,
        user_id: UserId,
        altes_passwort: &str,
        neues_passwort: &str,
        bestaetigung: &str,
    ) -> AuthResult<()> {
        neues_passwort_pruefen(neues_passwort, bestaetigung)?;

        let benutzer = self.benutzer_laden(user_id).await?;
        if !passwort_verifizieren(altes_passwort, &benutzer.password_hash)? {
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        self.hash_setzen(user_id, neues_passwort).await?;
        tracing::info!(user_id = %user_id, "Passwort geaendert");
        Ok(())
    }

    /// Setzt das Passwort allein anhand der Kontokennung neu
    pub async fn passwort_vergessen(
        &self,
        account: &str,
        neues_passwort: &str,
        bestaetigung: &str,
    ) -> AuthResult<()> {
        konto_pruefen(account, self.konfig.konto_domain.as_deref())?;
        neues_passwort_pruefen(neues_passwort, bestaetigung)?;

        let benutzer = self
            .user_repo
            .get_by_account(account)
            .await?
            .ok_or_else(|| AuthError::KontoNichtGefunden(account.to_string()))?;

        self.hash_setzen(benutzer.id, neues_passwort).await?;
        tracing::warn!(
            user_id = %benutzer.id,
            account = %account,
            "Passwort ohne erneute Authentifizierung zurueckgesetzt"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Benutzerverwaltung
    // -----------------------------------------------------------------------

    pub async fn profil(&self, user_id: UserId) -> AuthResult<BenutzerRecord> {
        self.benutzer_laden(user_id).await
    }

    pub async fn benutzer_liste(&self) -> AuthResult<Vec<BenutzerRecord>> {
        Ok(self.user_repo.list().await?)
    }

    /// Aendert Name und Tag des eigenen Kontos
    pub async fn profil_aktualisieren(
        &self,
        user_id: UserId,
        update: ProfilUpdate,
    ) -> AuthResult<BenutzerRecord> {
        Ok(self
            .user_repo
            .update(
                user_id,
                BenutzerUpdate {
                    full_name: update.full_name,
                    tag: update.tag,
                    ..Default::default()
                },
            )
            .await
            .map_err(nicht_gefunden_als_konto)?)
    }

    /// Legt ein Konto im Auftrag eines Verwalters an (ohne Sitzung)
    pub async fn benutzer_anlegen(
        &self,
        akteur: UserId,
        daten: Registrierung<'_>,
        rolle: Rolle,
    ) -> AuthResult<BenutzerRecord> {
        let akteur = self.benutzer_laden(akteur).await?;
        rechte::anlegen_pruefen(akteur.rolle, rolle)?;

        let benutzer = self.konto_anlegen(daten, rolle).await?;
        tracing::info!(
            akteur = %akteur.id,
            user_id = %benutzer.id,
            rolle = %rolle,
            "Konto durch Verwalter angelegt"
        );
        Ok(benutzer)
    }

    /// Aendert ein fremdes Konto (Name, Tag, Rolle)
    pub async fn benutzer_aktualisieren(
        &self,
        akteur: UserId,
        ziel: UserId,
        profil: ProfilUpdate,
        rolle: Option<Rolle>,
    ) -> AuthResult<BenutzerRecord> {
        let akteur = self.benutzer_laden(akteur).await?;
        let ziel = self.benutzer_laden(ziel).await?;
        rechte::aendern_pruefen(akteur.rolle, ziel.rolle, rolle)?;

        let aktualisiert = self
            .user_repo
            .update(
                ziel.id,
                BenutzerUpdate {
                    full_name: profil.full_name,
                    tag: profil.tag,
                    rolle,
                    password_hash: None,
                },
            )
            .await
            .map_err(nicht_gefunden_als_konto)?;

        tracing::info!(akteur = %akteur.id, user_id = %ziel.id, "Konto aktualisiert");
        Ok(aktualisiert)
    }

    /// Loescht ein fremdes Konto samt Refresh-Tokens
    pub async fn benutzer_loeschen(&self, akteur: UserId, ziel: UserId) -> AuthResult<()> {
        if akteur == ziel {
            return Err(AuthError::verweigert(
                "Das eigene Konto kann nicht geloescht werden",
            ));
        }
        let akteur = self.benutzer_laden(akteur).await?;
        let ziel = self.benutzer_laden(ziel).await?;
        rechte::loeschen_pruefen(akteur.id, akteur.rolle, ziel.id, ziel.rolle)?;

        if !self.user_repo.delete(ziel.id).await? {
            return Err(AuthError::KontoNichtGefunden(ziel.id.to_string()));
        }

        tracing::info!(akteur = %akteur.id, user_id = %ziel.id, "Konto geloescht");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Interne Hilfsfunktionen
    // -----------------------------------------------------------------------

    async fn konto_anlegen(&self, daten: Registrierung<'_>, rolle: Rolle) -> AuthResult<BenutzerRecord> {
        if daten.full_name.trim().is_empty() || daten.tag.trim().is_empty() {
            return Err(AuthError::eingabe("full_name und tag sind erforderlich"));
        }
        konto_pruefen(daten.account, self.konfig.konto_domain.as_deref())?;
        passwort_richtlinie_pruefen(daten.passwort)?;

        if self.user_repo.get_by_account(daten.account).await?.is_some() {
            return Err(AuthError::Konflikt(format!(
                "Konto '{}' existiert bereits",
                daten.account
            )));
        }

        let hash = passwort_hashen(daten.passwort, &self.konfig.passwort_kosten)?;
        self.user_repo
            .create(NeuerBenutzer {
                full_name: daten.full_name.trim(),
                account: daten.account,
                password_hash: &hash,
                tag: daten.tag.trim(),
                rolle,
            })
            .await
            .map_err(|e| match e {
                // Gleichzeitige Registrierung desselben Kontos
                DbError::Eindeutigkeit(msg) => AuthError::Konflikt(msg),
                andere => AuthError::from(andere),
            })
    }

    async fn benutzer_laden(&self, user_id: UserId) -> AuthResult<BenutzerRecord> {
        self.user_repo
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::KontoNichtGefunden(user_id.to_string()))
    }

    async fn hash_setzen(&self, user_id: UserId, passwort: &str) -> AuthResult<()> {
        let hash = passwort_hashen(passwort, &self.konfig.passwort_kosten)?;
        self.user_repo
            .update(
                user_id,
                BenutzerUpdate {
                    password_hash: Some(hash),
                    ..Default::default()
                },
            )
            .await
            .map_err(nicht_gefunden_als_konto)?;
        Ok(())
    }

    /// Liefert den Datensatz, wenn der Token gueltig signiert, aktiv und
    /// dem Benutzer zugeordnet ist; sonst `None`
    async fn wiederverwendbarer_refresh(
        &self,
        token: &str,
        user_id: UserId,
    ) -> AuthResult<Option<RefreshTokenRecord>> {
        let claims = match self.codec.pruefen_als(token, TokenArt::Refresh) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(fehler = %e, "Vorhandener Refresh-Token unbrauchbar");
                return Ok(None);
            }
        };
        if claims.sub != user_id {
            return Ok(None);
        }

        let record = self.token_repo.get_by_token(token).await?;
        Ok(record.filter(|r| r.user_id == user_id && r.ist_aktiv(Utc::now())))
    }

    fn access_ausstellen(
        &self,
        benutzer: &BenutzerRecord,
        ttl: Duration,
    ) -> AuthResult<AusgestellterToken> {
        Ok(self
            .codec
            .ausstellen(benutzer.id, benutzer.rolle, TokenArt::Access, ttl)?)
    }

    fn refresh_ausstellen(&self, benutzer: &BenutzerRecord) -> AuthResult<AusgestellterToken> {
        Ok(self.codec.ausstellen(
            benutzer.id,
            benutzer.rolle,
            TokenArt::Refresh,
            self.konfig.refresh_ttl,
        )?)
    }

    /// Wird beim ersten Fehlversuch mit unbekanntem Konto berechnet
    fn attrappen_hash(&self) -> &str {
        self.attrappe.get_or_init(|| {
            passwort_hashen("Attrappe#0000", &self.konfig.passwort_kosten).unwrap_or_else(|e| {
                tracing::error!(fehler = %e, "Attrappen-Hash nicht erzeugbar");
                String::new()
            })
        })
    }
}

fn token_paar(access: AusgestellterToken, refresh: AusgestellterToken) -> TokenPaar {
    TokenPaar {
        access_laeuft_ab: access.laeuft_ab_am(),
        access_token: access.token,
        refresh_laeuft_ab: refresh.laeuft_ab_am(),
        refresh_token: refresh.token,
    }
}

fn neues_passwort_pruefen(neu: &str, bestaetigung: &str) -> AuthResult<()> {
    if neu != bestaetigung {
        return Err(AuthError::eingabe(
            "Neues Passwort und Bestaetigung stimmen nicht ueberein",
        ));
    }
    passwort_richtlinie_pruefen(neu)
}

fn nicht_gefunden_als_konto(e: DbError) -> AuthError {
    match e {
        DbError::NichtGefunden(msg) => AuthError::KontoNichtGefunden(msg),
        andere => AuthError::from(andere),
    }
}
