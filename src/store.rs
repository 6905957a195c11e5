//! Database bootstrap: create the database and the per-entity document
//! tables if they do not exist. All DDL here is idempotent.

use crate::error::AppError;
use crate::registry::ModelRegistry;
use crate::sql;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Create one document table per registered entity.
pub async fn ensure_entity_tables(pool: &PgPool, registry: &ModelRegistry) -> Result<(), AppError> {
    for spec in registry.specs() {
        let ddl = sql::create_table(spec);
        tracing::debug!(table = spec.table_name, "ensuring entity table");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

/// Connect to the admin database and create the target database if missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE \"{}\"", db_name.replace('"', "\"\"")))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}
