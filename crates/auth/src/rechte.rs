//! Rollenregeln fuer die Benutzerverwaltung
//!
//! ROOT darf alles, ADMIN nur Konten mit Rolle USER anlegen, aendern und
//! loeschen, USER gar nichts. Das eigene Konto darf niemand loeschen.

use katalog_core::{Rolle, UserId};

use crate::error::{AuthError, AuthResult};

/// Darf `akteur` ein Konto mit Rolle `ziel` anlegen?
pub fn darf_anlegen(akteur: Rolle, ziel: Rolle) -> bool {
    match akteur {
        Rolle::Root => true,
        Rolle::Admin => ziel == Rolle::User,
        Rolle::User => false,
    }
}

/// Darf `akteur` ein bestehendes Konto mit Rolle `ziel` verwalten?
pub fn darf_verwalten(akteur: Rolle, ziel: Rolle) -> bool {
    darf_anlegen(akteur, ziel)
}

/// Prueft das Anlegen eines Kontos
pub fn anlegen_pruefen(akteur: Rolle, ziel: Rolle) -> AuthResult<()> {
    if darf_anlegen(akteur, ziel) {
        Ok(())
    } else {
        Err(AuthError::verweigert(format!(
            "{akteur} darf keine Konten mit Rolle {ziel} anlegen"
        )))
    }
}

/// Prueft das Aendern eines Kontos, optional mit neuer Rolle
pub fn aendern_pruefen(akteur: Rolle, ziel: Rolle, neue_rolle: Option<Rolle>) -> AuthResult<()> {
    if !darf_verwalten(akteur, ziel) {
        return Err(AuthError::verweigert(format!(
            "{akteur} darf Konten mit Rolle {ziel} nicht aendern"
        )));
    }
    match neue_rolle {
        Some(rolle) => anlegen_pruefen(akteur, rolle),
        None => Ok(()),
    }
}

/// Prueft das Loeschen eines Kontos
pub fn loeschen_pruefen(
    akteur_id: UserId,
    akteur: Rolle,
    ziel_id: UserId,
    ziel: Rolle,
) -> AuthResult<()> {
    if akteur_id == ziel_id {
        return Err(AuthError::verweigert("Das eigene Konto kann nicht geloescht werden"));
    }
    if !darf_verwalten(akteur, ziel) {
        return Err(AuthError::verweigert(format!(
            "{akteur} darf Konten mit Rolle {ziel} nicht loeschen"
        )));
    }
    Ok(())
}
