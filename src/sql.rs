//! Parameterized SQL for the per-entity document tables.
//!
//! Every entity is stored as `(id uuid, doc jsonb, created_at, updated_at)`;
//! filters use JSONB containment so list queries stay schemaless like the
//! documents themselves.

use crate::registry::TableSpec;
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: names only come from the registry).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

const ROW_COLUMNS: &str = "id, doc, created_at, updated_at";

/// SELECT list with optional containment filter, ORDER BY created_at, LIMIT/OFFSET.
pub fn select_list(spec: &TableSpec, filter: Option<&Value>, limit: u32, offset: u32) -> QueryBuf {
    let table = quoted(spec.table_name);
    let mut params = Vec::new();
    let where_clause = match filter {
        Some(f) if f.as_object().map(|m| !m.is_empty()).unwrap_or(false) => {
            params.push(f.clone());
            " WHERE doc @> $1::jsonb".to_string()
        }
        _ => String::new(),
    };
    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY created_at, id LIMIT {} OFFSET {}",
        ROW_COLUMNS, table, where_clause, limit, offset
    );
    QueryBuf { sql, params }
}

/// SELECT one row by primary key. Caller binds the id as sole param.
pub fn select_by_id(spec: &TableSpec) -> QueryBuf {
    QueryBuf {
        sql: format!(
            "SELECT {} FROM {} WHERE id = $1",
            ROW_COLUMNS,
            quoted(spec.table_name)
        ),
        params: Vec::new(),
    }
}

/// INSERT a document; id and timestamps come from table defaults.
pub fn insert(spec: &TableSpec, doc: &Value) -> QueryBuf {
    QueryBuf {
        sql: format!(
            "INSERT INTO {} (doc) VALUES ($1::jsonb) RETURNING {}",
            quoted(spec.table_name),
            ROW_COLUMNS
        ),
        params: vec![doc.clone()],
    }
}

/// UPDATE by id: shallow JSONB merge of the patch over the stored document.
/// Caller binds id as $1, then the patch.
pub fn update(spec: &TableSpec, patch: &Value) -> QueryBuf {
    QueryBuf {
        sql: format!(
            "UPDATE {} SET doc = doc || $2::jsonb, updated_at = NOW() WHERE id = $1 RETURNING {}",
            quoted(spec.table_name),
            ROW_COLUMNS
        ),
        params: vec![patch.clone()],
    }
}

/// DELETE by id, returning the deleted row. Caller binds id as sole param.
pub fn delete(spec: &TableSpec) -> QueryBuf {
    QueryBuf {
        sql: format!(
            "DELETE FROM {} WHERE id = $1 RETURNING {}",
            quoted(spec.table_name),
            ROW_COLUMNS
        ),
        params: Vec::new(),
    }
}

/// Idempotent DDL for one entity table.
pub fn create_table(spec: &TableSpec) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         id UUID PRIMARY KEY DEFAULT gen_random_uuid(), \
         doc JSONB NOT NULL, \
         created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
         updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW())",
        quoted(spec.table_name)
    )
}
