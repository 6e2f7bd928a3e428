//! SQLite-Implementierung des UserRepository

use chrono::Utc;
use sqlx::Row as _;

use katalog_core::{Rolle, UserId};

use crate::error::DbError;
use crate::models::{BenutzerRecord, BenutzerUpdate, NeuerBenutzer};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{uuid_parsen, zeit_parsen, zeit_text};

const SPALTEN: &str =
    "id, full_name, account, password_hash, tag, role_user, created_at, updated_at";

impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let id = UserId::new();
        let now = Utc::now();
        let now_str = zeit_text(now);

        sqlx::query(
            "INSERT INTO users (id, full_name, account, password_hash, tag, role_user, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.full_name)
        .bind(data.account)
        .bind(data.password_hash)
        .bind(data.tag)
        .bind(data.rolle.as_str())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::aus_schreibfehler(e, format!("Konto '{}' bereits vergeben", data.account))
        })?;

        Ok(BenutzerRecord {
            id,
            full_name: data.full_name.to_string(),
            account: data.account.to_string(),
            password_hash: data.password_hash.to_string(),
            tag: data.tag.to_string(),
            rolle: data.rolle,
            // Gleiche Genauigkeit wie beim erneuten Laden
            created_at: zeit_parsen("created_at", &now_str)?,
            updated_at: zeit_parsen("updated_at", &now_str)?,
        })
    }

    async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_account(&self, account: &str) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE account = ?"))
            .bind(account)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update(&self, id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord> {
        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.full_name.is_some() {
            sets.push("full_name = ?");
        }
        if data.tag.is_some() {
            sets.push("tag = ?");
        }
        if data.rolle.is_some() {
            sets.push("role_user = ?");
        }
        if data.password_hash.is_some() {
            sets.push("password_hash = ?");
        }

        if sets.is_empty() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("User {id}")));
        }
        sets.push("updated_at = ?");

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = data.full_name {
            q = q.bind(v);
        }
        if let Some(ref v) = data.tag {
            q = q.bind(v);
        }
        if let Some(v) = data.rolle {
            q = q.bind(v.as_str());
        }
        if let Some(ref v) = data.password_hash {
            q = q.bind(v);
        }
        q = q.bind(zeit_text(Utc::now())).bind(id.to_string());

        let affected = q.execute(&self.pool).await?.rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("User {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("User nach Update nicht gefunden"))
    }

    async fn delete(&self, id: UserId) -> DbResult<bool> {
        // refresh_tokens haengen per ON DELETE CASCADE am Benutzer
        let affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list(&self) -> DbResult<Vec<BenutzerRecord>> {
        let rows = sqlx::query(&format!("SELECT {SPALTEN} FROM users ORDER BY created_at"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_benutzer).collect()
    }
}

fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    let id_str: String = row.try_get("id")?;
    let rolle_str: String = row.try_get("role_user")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(BenutzerRecord {
        id: UserId(uuid_parsen("id", &id_str)?),
        full_name: row.try_get("full_name")?,
        account: row.try_get("account")?,
        password_hash: row.try_get("password_hash")?,
        tag: row.try_get("tag")?,
        rolle: Rolle::parsen(&rolle_str),
        created_at: zeit_parsen("created_at", &created_at)?,
        updated_at: zeit_parsen("updated_at", &updated_at)?,
    })
}
