//! SQLite-Implementierung des StandortRepository

use chrono::Utc;
use sqlx::Row as _;

use katalog_core::StandortId;

use crate::error::DbError;
use crate::models::StandortRecord;
use crate::repository::{DbResult, StandortRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{uuid_parsen, zeit_parsen, zeit_text};

impl StandortRepository for SqliteDb {
    async fn create(&self, name_local: &str) -> DbResult<StandortRecord> {
        let id = StandortId::new();
        let now_str = zeit_text(Utc::now());

        sqlx::query(
            "INSERT INTO locations (location_id, name_local, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(name_local)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::aus_schreibfehler(e, format!("Standort '{name_local}'")))?;

        Ok(StandortRecord {
            id,
            name_local: name_local.to_string(),
            created_at: zeit_parsen("created_at", &now_str)?,
            updated_at: zeit_parsen("updated_at", &now_str)?,
        })
    }

    async fn get_by_id(&self, id: StandortId) -> DbResult<Option<StandortRecord>> {
        let row = sqlx::query(
            "SELECT location_id, name_local, created_at, updated_at
             FROM locations WHERE location_id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_standort(&r)).transpose()
    }

    async fn update(&self, id: StandortId, name_local: &str) -> DbResult<StandortRecord> {
        let affected = sqlx::query(
            "UPDATE locations SET name_local = ?, updated_at = ? WHERE location_id = ?",
        )
        .bind(name_local)
        .bind(zeit_text(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Standort {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Standort nach Update nicht gefunden"))
    }

    async fn delete(&self, id: StandortId) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM locations WHERE location_id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list(&self) -> DbResult<Vec<StandortRecord>> {
        let rows = sqlx::query(
            "SELECT location_id, name_local, created_at, updated_at
             FROM locations ORDER BY name_local",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_standort).collect()
    }
}

fn row_to_standort(row: &sqlx::sqlite::SqliteRow) -> DbResult<StandortRecord> {
    let id: String = row.try_get("location_id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(StandortRecord {
        id: StandortId(uuid_parsen("location_id", &id)?),
        name_local: row.try_get("name_local")?,
        created_at: zeit_parsen("created_at", &created_at)?,
        updated_at: zeit_parsen("updated_at", &updated_at)?,
    })
}
