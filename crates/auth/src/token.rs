//! Token-Codec fuer signierte Bearer-Tokens (JWT, HS256)
//!
//! Access- und Refresh-Tokens unterscheiden sich nur im Claim `typ`.
//! Access-Tokens werden rein lokal geprueft; Refresh-Tokens zusaetzlich
//! gegen den Refresh-Token-Store (siehe [`crate::service`]). Ein Token der
//! falschen Art wird wie ein fehlerhafter Token abgelehnt.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use katalog_core::{Rolle, UserId};

/// Fehler bei Ausstellung und Pruefung von Tokens
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenFehler {
    #[error("Token-Signatur ungueltig")]
    Signatur,

    #[error("Token fehlerhaft: {0}")]
    Fehlerhaft(String),

    #[error("Token abgelaufen")]
    Abgelaufen,

    #[error("Token konnte nicht signiert werden: {0}")]
    Signieren(String),

    #[error("Signaturschluessel fehlt")]
    SchluesselFehlt,

    #[error("{erwartet}-Token erwartet, {erhalten}-Token erhalten")]
    FalscheArt { erwartet: TokenArt, erhalten: TokenArt },
}

/// Verwendungszweck eines Tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenArt {
    /// Kurzlebig, berechtigt API- und WebSocket-Zugriffe
    Access,
    /// Langlebig, nur zum Erneuern von Access-Tokens
    Refresh,
}

impl fmt::Display for TokenArt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        })
    }
}

/// Claims eines Access- oder Refresh-Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Benutzer-ID
    pub sub: UserId,
    pub role: Rolle,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub typ: TokenArt,
}

impl Claims {
    pub fn laeuft_ab_am(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Ein frisch ausgestellter Token mit seinen Claims
#[derive(Debug, Clone)]
pub struct AusgestellterToken {
    pub token: String,
    pub claims: Claims,
}

impl AusgestellterToken {
    pub fn laeuft_ab_am(&self) -> DateTime<Utc> {
        self.claims.laeuft_ab_am()
    }
}

/// Signiert und prueft Tokens mit einem symmetrischen Schluessel
///
/// Zustandslos; eine Instanz wird beim Start erzeugt und geteilt.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Erstellt einen Codec; ein leerer Schluessel wird abgelehnt
    pub fn neu(schluessel: &[u8]) -> Result<Self, TokenFehler> {
        if schluessel.is_empty() {
            return Err(TokenFehler::SchluesselFehlt);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Ablauf strikt: exp in der Vergangenheit ist abgelaufen
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(schluessel),
            decoding: DecodingKey::from_secret(schluessel),
            validation,
        })
    }

    /// Stellt einen Token aus: `iat = nbf = jetzt`, `exp = jetzt + ttl`
    pub fn ausstellen(
        &self,
        subject: UserId,
        rolle: Rolle,
        art: TokenArt,
        ttl: Duration,
    ) -> Result<AusgestellterToken, TokenFehler> {
        let jetzt = Utc::now().timestamp();
        let claims = Claims {
            sub: subject,
            role: rolle,
            iat: jetzt,
            nbf: jetzt,
            exp: jetzt + ttl.num_seconds(),
            typ: art,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenFehler::Signieren(e.to_string()))?;

        Ok(AusgestellterToken { token, claims })
    }

    /// Prueft Signatur, dann Ablauf; kein Store-Zugriff
    pub fn pruefen(&self, token: &str) -> Result<Claims, TokenFehler> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|daten| daten.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenFehler::Signatur,
                ErrorKind::ExpiredSignature => TokenFehler::Abgelaufen,
                ErrorKind::ImmatureSignature => {
                    TokenFehler::Fehlerhaft("Token noch nicht gueltig".into())
                }
                _ => TokenFehler::Fehlerhaft(e.to_string()),
            })
    }

    /// Wie [`TokenCodec::pruefen`], verlangt zusaetzlich die Token-Art
    pub fn pruefen_als(&self, token: &str, art: TokenArt) -> Result<Claims, TokenFehler> {
        let claims = self.pruefen(token)?;
        if claims.typ != art {
            return Err(TokenFehler::FalscheArt {
                erwartet: art,
                erhalten: claims.typ,
            });
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}
