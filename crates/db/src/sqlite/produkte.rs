//! SQLite-Implementierung des ProduktRepository

use chrono::Utc;
use sqlx::Row as _;

use katalog_core::{FabrikId, ProduktId};

use crate::error::DbError;
use crate::models::{NeuesProdukt, ProduktRecord, ProduktUpdate};
use crate::repository::{DbResult, ProduktRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{datum_parsen, uuid_parsen, zeit_parsen, zeit_text};

const SPALTEN: &str = "product_id, title, image, video, status, describe_product, year_product, \
                       factory_id, created_at, updated_at";

impl ProduktRepository for SqliteDb {
    async fn create(&self, data: NeuesProdukt<'_>) -> DbResult<ProduktRecord> {
        let id = ProduktId::new();
        let now_str = zeit_text(Utc::now());

        sqlx::query(&format!(
            "INSERT INTO products ({SPALTEN}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(id.to_string())
        .bind(data.title)
        .bind(data.image)
        .bind(data.video)
        .bind(data.status)
        .bind(data.describe_product)
        .bind(data.year_product.format("%Y-%m-%d").to_string())
        .bind(data.factory_id.to_string())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::aus_schreibfehler(e, format!("Produkt '{}'", data.title)))?;

        Ok(ProduktRecord {
            id,
            title: data.title.to_string(),
            image: data.image.to_string(),
            video: data.video.map(str::to_string),
            status: data.status.to_string(),
            describe_product: data.describe_product.to_string(),
            year_product: data.year_product,
            factory_id: data.factory_id,
            created_at: zeit_parsen("created_at", &now_str)?,
            updated_at: zeit_parsen("updated_at", &now_str)?,
        })
    }

    async fn get_by_id(&self, id: ProduktId) -> DbResult<Option<ProduktRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM products WHERE product_id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_produkt(&r)).transpose()
    }

    async fn update(&self, id: ProduktId, data: ProduktUpdate) -> DbResult<ProduktRecord> {
        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.title.is_some() {
            sets.push("title = ?");
        }
        if data.image.is_some() {
            sets.push("image = ?");
        }
        if data.video.is_some() {
            sets.push("video = ?");
        }
        if data.status.is_some() {
            sets.push("status = ?");
        }
        if data.describe_product.is_some() {
            sets.push("describe_product = ?");
        }
        if data.year_product.is_some() {
            sets.push("year_product = ?");
        }
        if data.factory_id.is_some() {
            sets.push("factory_id = ?");
        }
        sets.push("updated_at = ?");

        let sql = format!("UPDATE products SET {} WHERE product_id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = data.title {
            q = q.bind(v);
        }
        if let Some(ref v) = data.image {
            q = q.bind(v);
        }
        if let Some(ref v) = data.video {
            q = q.bind(v);
        }
        if let Some(ref v) = data.status {
            q = q.bind(v);
        }
        if let Some(ref v) = data.describe_product {
            q = q.bind(v);
        }
        if let Some(v) = data.year_product {
            q = q.bind(v.format("%Y-%m-%d").to_string());
        }
        if let Some(v) = data.factory_id {
            q = q.bind(v.to_string());
        }
        q = q.bind(zeit_text(Utc::now())).bind(id.to_string());

        let affected = q
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::aus_schreibfehler(e, format!("Produkt {id}")))?
            .rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Produkt {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Produkt nach Update nicht gefunden"))
    }

    async fn delete(&self, id: ProduktId) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM products WHERE product_id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list(&self) -> DbResult<Vec<ProduktRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_produkt).collect()
    }

    async fn list_by_fabrik(&self, factory_id: FabrikId) -> DbResult<Vec<ProduktRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM products WHERE factory_id = ? ORDER BY created_at DESC"
        ))
        .bind(factory_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_produkt).collect()
    }
}

fn row_to_produkt(row: &sqlx::sqlite::SqliteRow) -> DbResult<ProduktRecord> {
    let id: String = row.try_get("product_id")?;
    let factory_id: String = row.try_get("factory_id")?;
    let year: String = row.try_get("year_product")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(ProduktRecord {
        id: ProduktId(uuid_parsen("product_id", &id)?),
        title: row.try_get("title")?,
        image: row.try_get("image")?,
        video: row.try_get("video")?,
        status: row.try_get("status")?,
        describe_product: row.try_get("describe_product")?,
        year_product: datum_parsen("year_product", &year)?,
        factory_id: FabrikId(uuid_parsen("factory_id", &factory_id)?),
        created_at: zeit_parsen("created_at", &created_at)?,
        updated_at: zeit_parsen("updated_at", &updated_at)?,
    })
}
