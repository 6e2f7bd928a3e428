//! Periodische Bereinigung des Refresh-Token-Stores
//!
//! Loescht Tokens, die widerrufen UND abgelaufen sind. Der erste Lauf
//! erfolgt ein Intervall nach dem Start. Fehler werden geloggt, der
//! naechste Lauf findet trotzdem statt.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use katalog_db::repository::RefreshTokenRepository;

/// Standardintervall: einmal taeglich
pub const STANDARD_INTERVALL: Duration = Duration::from_secs(24 * 60 * 60);

/// Startet den Bereinigungs-Task
///
/// Der Task endet, sobald `shutdown` auf `true` wechselt oder der Sender
/// gedroppt wird.
pub fn bereinigung_starten<R>(
    repo: Arc<R>,
    intervall: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    R: RefreshTokenRepository + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + intervall, intervall);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(intervall_sek = intervall.as_secs(), "Token-Bereinigung gestartet");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match repo.cleanup_revoked_expired().await {
                        Ok(anzahl) => {
                            tracing::info!(geloescht = anzahl, "Refresh-Tokens bereinigt");
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "Token-Bereinigung fehlgeschlagen");
                        }
                    }
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Token-Bereinigung beendet");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use katalog_core::UserId;
    use katalog_db::{
        models::{NeuerRefreshToken, RefreshTokenRecord},
        DbError, DbResult,
    };

    // Zaehlt Aufrufe; der erste schlaegt fehl
    #[derive(Default)]
    struct ZaehlRepo {
        aufrufe: AtomicU32,
    }

    impl RefreshTokenRepository for ZaehlRepo {
        async fn create(&self, _data: NeuerRefreshToken<'_>) -> DbResult<RefreshTokenRecord> {
            Err(DbError::intern("nicht benutzt"))
        }

        async fn get_by_token(&self, _token: &str) -> DbResult<Option<RefreshTokenRecord>> {
            Ok(None)
        }

        async fn delete_by_token(&self, _token: &str) -> DbResult<bool> {
            Ok(false)
        }

        async fn revoke_by_user(&self, _user_id: UserId) -> DbResult<u64> {
            Ok(0)
        }

        async fn cleanup_revoked_expired(&self) -> DbResult<u64> {
            let n = self.aufrufe.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(DbError::intern("Datenbank gesperrt"))
            } else {
                Ok(2)
            }
        }

        async fn ersetzen_fuer_benutzer(
            &self,
            _data: NeuerRefreshToken<'_>,
        ) -> DbResult<RefreshTokenRecord> {
            Err(DbError::intern("nicht benutzt"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn laeuft_pro_intervall_und_ueberlebt_fehler() {
        let repo = Arc::new(ZaehlRepo::default());
        let (tx, rx) = watch::channel(false);
        let intervall = Duration::from_secs(60);

        let handle = bereinigung_starten(Arc::clone(&repo), intervall, rx);

        // Kein Lauf direkt beim Start
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(repo.aufrufe.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(160)).await;
        assert_eq!(repo.aufrufe.load(Ordering::SeqCst), 3);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn endet_wenn_sender_wegfaellt() {
        let repo = Arc::new(ZaehlRepo::default());
        let (tx, rx) = watch::channel(false);
        let handle = bereinigung_starten(repo, STANDARD_INTERVALL, rx);

        drop(tx);
        handle.await.unwrap();
    }
}
