//! Passwort-Hashing mit Argon2id und Passwort-Richtlinie
//!
//! Stellt sichere Passwort-Hashfunktionen mit Argon2id bereit.
//! Argon2id ist der empfohlene Algorithmus gemaess OWASP-Richtlinien.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

use crate::error::AuthError;

/// Sonderzeichen, von denen ein Passwort mindestens eines enthalten muss
pub const SONDERZEICHEN: &str = r"!@#~$%^&*()_+|<>?{}[]\/";

/// Minimale Passwortlaenge
pub const MIN_PASSWORT_LAENGE: usize = 8;

/// Argon2id-Kostenparameter
///
/// Standardwerte gemaess OWASP-Empfehlungen (Stand 2024):
/// - Speicher: 64 MiB
/// - Iterationen: 3
/// - Parallelismus: 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswortKosten {
    pub speicher_kib: u32,
    pub iterationen: u32,
    pub parallelitaet: u32,
}

impl Default for PasswortKosten {
    fn default() -> Self {
        Self {
            speicher_kib: 64 * 1024,
            iterationen: 3,
            parallelitaet: 1,
        }
    }
}

impl PasswortKosten {
    /// Minimale Kosten, nur fuer Tests
    pub fn minimal() -> Self {
        Self {
            speicher_kib: Params::MIN_M_COST,
            iterationen: 1,
            parallelitaet: 1,
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.speicher_kib, self.iterationen, self.parallelitaet, None)
            .map_err(|e| AuthError::PasswortHashing(format!("Argon2-Parameter ungueltig: {e}")))?;
        Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hasht ein Passwort mit Argon2id und einem zufaelligen Salt
///
/// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
pub fn passwort_hashen(passwort: &str, kosten: &PasswortKosten) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    kosten
        .argon2()?
        .hash_password(passwort.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswortHashing(e.to_string()))
}

/// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
///
/// Die Kostenparameter stammen aus dem Hash selbst.
pub fn passwort_verifizieren(passwort: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

    match Argon2::default().verify_password(passwort.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
    }
}

/// Prueft die Passwort-Richtlinie
///
/// Mindestens 8 Zeichen, ein Grossbuchstabe, eine Ziffer und ein
/// Sonderzeichen aus [`SONDERZEICHEN`].
pub fn passwort_richtlinie_pruefen(passwort: &str) -> Result<(), AuthError> {
    if passwort.chars().count() < MIN_PASSWORT_LAENGE {
        return Err(AuthError::eingabe(format!(
            "Passwort muss mindestens {MIN_PASSWORT_LAENGE} Zeichen lang sein"
        )));
    }
    if !passwort.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::eingabe("Passwort braucht einen Grossbuchstaben"));
    }
    if !passwort.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::eingabe("Passwort braucht eine Ziffer"));
    }
    if !passwort.chars().any(|c| SONDERZEICHEN.contains(c)) {
        return Err(AuthError::eingabe("Passwort braucht ein Sonderzeichen"));
    }
    Ok(())
}

/// Prueft die Kontokennung (E-Mail) und optional deren Domain
pub fn konto_pruefen(account: &str, domain: Option<&str>) -> Result<(), AuthError> {
    let (lokal, host) = account
        .split_once('@')
        .ok_or_else(|| AuthError::eingabe("Konto muss eine E-Mail-Adresse sein"))?;
    if lokal.is_empty() || host.is_empty() || account.chars().any(char::is_whitespace) {
        return Err(AuthError::eingabe("Konto muss eine E-Mail-Adresse sein"));
    }

    if let Some(domain) = domain.filter(|d| !d.is_empty()) {
        let domain = domain.trim_start_matches('@');
        if !host.eq_ignore_ascii_case(domain) {
            return Err(AuthError::eingabe(format!("Konto muss auf @{domain} enden")));
        }
    }
    Ok(())
}
