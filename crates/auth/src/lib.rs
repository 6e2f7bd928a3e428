//! katalog-auth – Sitzungsverwaltung
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id und Passwort-Richtlinie
//! - Token-Codec fuer signierte Access- und Refresh-Tokens (JWT, HS256)
//! - AuthService (Registrierung, Anmeldung, Erneuerung, Abmeldung, Passwoerter)
//! - Rollenregeln fuer die Benutzerverwaltung
//! - Periodische Bereinigung des Refresh-Token-Stores

pub mod cleanup;
pub mod error;
pub mod password;
pub mod rechte;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use cleanup::bereinigung_starten;
pub use error::{AuthError, AuthResult};
pub use password::{passwort_hashen, passwort_verifizieren, PasswortKosten};
pub use service::{
    Anmeldung, AuthKonfig, AuthService, ErneuerterZugang, ProfilUpdate, Registrierung, TokenPaar,
};
pub use token::{Claims, TokenArt, TokenCodec, TokenFehler};
