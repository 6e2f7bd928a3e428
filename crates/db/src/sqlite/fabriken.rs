//! SQLite-Implementierung des FabrikRepository

use chrono::Utc;
use sqlx::Row as _;

use katalog_core::{FabrikId, StandortId};

use crate::error::DbError;
use crate::models::{FabrikRecord, FabrikUpdate, NeueFabrik};
use crate::repository::{DbResult, FabrikRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{uuid_parsen, zeit_parsen, zeit_text};

const SPALTEN: &str = "factory_id, name_factory, location_id, created_at, updated_at";

impl FabrikRepository for SqliteDb {
    async fn create(&self, data: NeueFabrik<'_>) -> DbResult<FabrikRecord> {
        let id = FabrikId::new();
        let now_str = zeit_text(Utc::now());

        sqlx::query(
            "INSERT INTO factories (factory_id, name_factory, location_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.name_factory)
        .bind(data.location_id.to_string())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::aus_schreibfehler(e, format!("Fabrik '{}'", data.name_factory)))?;

        Ok(FabrikRecord {
            id,
            name_factory: data.name_factory.to_string(),
            location_id: data.location_id,
            created_at: zeit_parsen("created_at", &now_str)?,
            updated_at: zeit_parsen("updated_at", &now_str)?,
        })
    }

    async fn get_by_id(&self, id: FabrikId) -> DbResult<Option<FabrikRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM factories WHERE factory_id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_fabrik(&r)).transpose()
    }

    async fn update(&self, id: FabrikId, data: FabrikUpdate) -> DbResult<FabrikRecord> {
        let mut sets: Vec<&str> = Vec::new();
        if data.name_factory.is_some() {
            sets.push("name_factory = ?");
        }
        if data.location_id.is_some() {
            sets.push("location_id = ?");
        }
        sets.push("updated_at = ?");

        let sql = format!("UPDATE factories SET {} WHERE factory_id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);
        if let Some(ref v) = data.name_factory {
            q = q.bind(v);
        }
        if let Some(v) = data.location_id {
            q = q.bind(v.to_string());
        }
        q = q.bind(zeit_text(Utc::now())).bind(id.to_string());

        let affected = q
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::aus_schreibfehler(e, format!("Fabrik {id}")))?
            .rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Fabrik {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Fabrik nach Update nicht gefunden"))
    }

    async fn delete(&self, id: FabrikId) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM factories WHERE factory_id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list(&self) -> DbResult<Vec<FabrikRecord>> {
        let rows = sqlx::query(&format!("SELECT {SPALTEN} FROM factories ORDER BY name_factory"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_fabrik).collect()
    }

    async fn list_by_standort(&self, location_id: StandortId) -> DbResult<Vec<FabrikRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM factories WHERE location_id = ? ORDER BY name_factory"
        ))
        .bind(location_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_fabrik).collect()
    }
}

fn row_to_fabrik(row: &sqlx::sqlite::SqliteRow) -> DbResult<FabrikRecord> {
    let id: String = row.try_get("factory_id")?;
    let location_id: String = row.try_get("location_id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(FabrikRecord {
        id: FabrikId(uuid_parsen("factory_id", &id)?),
        name_factory: row.try_get("name_factory")?,
        location_id: StandortId(uuid_parsen("location_id", &location_id)?),
        created_at: zeit_parsen("created_at", &created_at)?,
        updated_at: zeit_parsen("updated_at", &updated_at)?,
    })
}
