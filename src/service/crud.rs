//! Generic document CRUD against PostgreSQL.
//!
//! Rows come back as JSON objects: the stored document with `id`,
//! `created_at`, and `updated_at` merged over it.

use crate::error::AppError;
use crate::registry::TableSpec;
use crate::sql;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct CrudService;

impl CrudService {
    /// List documents with an optional containment filter (exact match on
    /// top-level fields), limit (default 100, max 1000), offset (default 0).
    pub async fn list(
        pool: &PgPool,
        spec: &TableSpec,
        filter: &Map<String, Value>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        const DEFAULT_LIMIT: u32 = 100;
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(1000);
        let offset = offset.unwrap_or(0);
        let filter_value = Value::Object(filter.clone());
        let q = sql::select_list(spec, Some(&filter_value), limit, offset);
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p);
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_document).collect())
    }

    /// Fetch one document by id. Returns None when the row does not exist.
    pub async fn read(
        pool: &PgPool,
        spec: &TableSpec,
        id: uuid::Uuid,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(spec);
        tracing::debug!(sql = %q.sql, %id, "query");
        let row = sqlx::query(&q.sql).bind(id).fetch_optional(pool).await?;
        Ok(row.as_ref().map(row_to_document))
    }

    /// Insert one document. Returns the created row.
    pub async fn create(
        pool: &PgPool,
        spec: &TableSpec,
        doc: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let q = sql::insert(spec, &Value::Object(doc.clone()));
        tracing::debug!(sql = %q.sql, "query");
        let row = sqlx::query(&q.sql)
            .bind(&q.params[0])
            .fetch_one(pool)
            .await?;
        Ok(row_to_document(&row))
    }

    /// Insert many documents in one transaction. Returns the created rows.
    pub async fn create_many(
        pool: &PgPool,
        spec: &TableSpec,
        docs: &[Map<String, Value>],
    ) -> Result<Vec<Value>, AppError> {
        const BULK_LIMIT: usize = 100;
        if docs.len() > BULK_LIMIT {
            return Err(AppError::BadRequest(format!(
                "bulk create limited to {} items",
                BULK_LIMIT
            )));
        }
        let mut out = Vec::with_capacity(docs.len());
        let mut tx = pool.begin().await?;
        for doc in docs {
            let q = sql::insert(spec, &Value::Object(doc.clone()));
            tracing::debug!(sql = %q.sql, "query (tx)");
            let row = sqlx::query(&q.sql)
                .bind(&q.params[0])
                .fetch_one(&mut *tx)
                .await?;
            out.push(row_to_document(&row));
        }
        tx.commit().await?;
        Ok(out)
    }

    /// Shallow-merge a patch over the stored document. None when no such row.
    pub async fn update(
        pool: &PgPool,
        spec: &TableSpec,
        id: uuid::Uuid,
        patch: &Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::update(spec, &Value::Object(patch.clone()));
        tracing::debug!(sql = %q.sql, %id, "query");
        let row = sqlx::query(&q.sql)
            .bind(id)
            .bind(&q.params[0])
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(row_to_document))
    }

    /// Delete by id. Returns the deleted row or None.
    pub async fn delete(
        pool: &PgPool,
        spec: &TableSpec,
        id: uuid::Uuid,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::delete(spec);
        tracing::debug!(sql = %q.sql, %id, "query");
        let row = sqlx::query(&q.sql).bind(id).fetch_optional(pool).await?;
        Ok(row.as_ref().map(row_to_document))
    }
}

/// Merge the stored document with the row's own columns. Row columns win on
/// key collision so `id` is always the real primary key.
fn row_to_document(row: &PgRow) -> Value {
    let mut map = match row.try_get::<Value, _>("doc") {
        Ok(Value::Object(m)) => m,
        _ => Map::new(),
    };
    if let Ok(id) = row.try_get::<uuid::Uuid, _>("id") {
        map.insert("id".to_string(), Value::String(id.to_string()));
    }
    if let Ok(t) = row.try_get::<chrono::DateTime<chrono::Utc>, _>("created_at") {
        map.insert("created_at".to_string(), Value::String(t.to_rfc3339()));
    }
    if let Ok(t) = row.try_get::<chrono::DateTime<chrono::Utc>, _>("updated_at") {
        map.insert("updated_at".to_string(), Value::String(t.to_rfc3339()));
    }
    Value::Object(map)
}
