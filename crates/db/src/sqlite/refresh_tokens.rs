//! SQLite-Implementierung des RefreshTokenRepository

use chrono::Utc;
use sqlx::Row as _;

use katalog_core::UserId;

use crate::error::DbError;
use crate::models::{NeuerRefreshToken, RefreshTokenRecord};
use crate::repository::{DbResult, RefreshTokenRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{uuid_parsen, zeit_parsen, zeit_text};

// Derselbe Token-String kann bei zwei Ausstellungen in derselben Sekunde
// entstehen; der vorhandene Datensatz wird dann reaktiviert.
const INSERT_SQL: &str = "INSERT INTO refresh_tokens (token, user_id, expires_at, revoked, created_at)
     VALUES (?, ?, ?, 0, ?)
     ON CONFLICT(token) DO UPDATE SET
        user_id = excluded.user_id,
        expires_at = excluded.expires_at,
        revoked = 0";

const REVOKE_SQL: &str = "UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ? AND revoked = 0";

impl RefreshTokenRepository for SqliteDb {
    async fn create(&self, data: NeuerRefreshToken<'_>) -> DbResult<RefreshTokenRecord> {
        let now_str = zeit_text(Utc::now());
        let expires_str = zeit_text(data.expires_at);

        sqlx::query(INSERT_SQL)
            .bind(data.token)
            .bind(data.user_id.to_string())
            .bind(&expires_str)
            .bind(&now_str)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DbError::aus_schreibfehler(e, format!("Refresh-Token fuer {}", data.user_id))
            })?;

        tracing::debug!(user_id = %data.user_id, "Refresh-Token gespeichert");
        gespeicherter_record(data, &expires_str, &now_str)
    }

    async fn get_by_token(&self, token: &str) -> DbResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query(
            "SELECT token, user_id, expires_at, revoked, created_at
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_refresh_token(&r)).transpose()
    }

    async fn delete_by_token(&self, token: &str) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn revoke_by_user(&self, user_id: UserId) -> DbResult<u64> {
        let affected = sqlx::query(REVOKE_SQL)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }

    async fn cleanup_revoked_expired(&self) -> DbResult<u64> {
        let affected =
            sqlx::query("DELETE FROM refresh_tokens WHERE revoked = 1 AND expires_at < ?")
                .bind(zeit_text(Utc::now()))
                .execute(&self.pool)
                .await?
                .rows_affected();
        Ok(affected)
    }

    async fn ersetzen_fuer_benutzer(
        &self,
        data: NeuerRefreshToken<'_>,
    ) -> DbResult<RefreshTokenRecord> {
        let now_str = zeit_text(Utc::now());
        let expires_str = zeit_text(data.expires_at);

        let mut tx = self.pool.begin().await?;

        let widerrufen = sqlx::query(REVOKE_SQL)
            .bind(data.user_id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(INSERT_SQL)
            .bind(data.token)
            .bind(data.user_id.to_string())
            .bind(&expires_str)
            .bind(&now_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DbError::aus_schreibfehler(e, format!("Refresh-Token fuer {}", data.user_id))
            })?;

        tx.commit().await?;

        tracing::debug!(
            user_id = %data.user_id,
            widerrufen,
            "Refresh-Token ersetzt"
        );
        gespeicherter_record(data, &expires_str, &now_str)
    }
}

fn gespeicherter_record(
    data: NeuerRefreshToken<'_>,
    expires_str: &str,
    now_str: &str,
) -> DbResult<RefreshTokenRecord> {
    Ok(RefreshTokenRecord {
        token: data.token.to_string(),
        user_id: data.user_id,
        expires_at: zeit_parsen("expires_at", expires_str)?,
        revoked: false,
        created_at: zeit_parsen("created_at", now_str)?,
    })
}

fn row_to_refresh_token(row: &sqlx::sqlite::SqliteRow) -> DbResult<RefreshTokenRecord> {
    let user_id: String = row.try_get("user_id")?;
    let expires_at: String = row.try_get("expires_at")?;
    let created_at: String = row.try_get("created_at")?;
    let revoked: i64 = row.try_get("revoked")?;

    Ok(RefreshTokenRecord {
        token: row.try_get("token")?,
        user_id: UserId(uuid_parsen("user_id", &user_id)?),
        expires_at: zeit_parsen("expires_at", &expires_at)?,
        revoked: revoked != 0,
        created_at: zeit_parsen("created_at", &created_at)?,
    })
}
