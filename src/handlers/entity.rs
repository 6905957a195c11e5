//! Generic entity CRUD handlers: list, create, read, update, delete, bulk.
//!
//! Dynamic handlers resolve the entity from the `:table_name` path segment;
//! `*_bound` variants carry a fixed binding from route setup and ignore any
//! path parameter. Both go through `dispatch::resolve`, so a handler never
//! duplicates model-resolution logic.

use crate::dispatch::{self, Binding, Target};
use crate::envelope::{encode_response, Envelope};
use crate::error::AppError;
use crate::extractors::DecryptedJson;
use crate::registry::EntityKind;
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

type EnvelopeResponse = (StatusCode, Json<Envelope>);

fn parse_id(id_str: &str) -> Result<uuid::Uuid, AppError> {
    uuid::Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest("invalid id".into()))
}

/// Body must be a JSON object once decoded; the route parameter is stripped
/// so it never lands in the stored document.
fn body_to_doc(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(mut m) => {
            dispatch::strip_route_param(&mut m);
            Ok(m)
        }
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Query params become a containment filter. `limit`/`offset` are paging,
/// everything else matches against top-level document fields. Values parse
/// as bool/number when they look like one, else match as strings.
fn parse_query(
    params: HashMap<String, String>,
) -> (Map<String, Value>, Option<u32>, Option<u32>) {
    let mut limit = None;
    let mut offset = None;
    let mut filter = Map::new();
    for (k, v) in params {
        match k.as_str() {
            "limit" => limit = v.parse().ok(),
            "offset" => offset = v.parse().ok(),
            _ => {
                filter.insert(k, query_value(&v));
            }
        }
    }
    dispatch::strip_route_param(&mut filter);
    (filter, limit, offset)
}

fn query_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(s.to_string())
}

async fn do_list(
    state: &AppState,
    target: Target,
    params: HashMap<String, String>,
) -> Result<EnvelopeResponse, AppError> {
    let spec = target.table()?;
    let (filter, limit, offset) = parse_query(params);
    let rows = CrudService::list(&state.pool, spec, &filter, limit, offset).await?;
    Ok(encode_response(
        &state.codec,
        StatusCode::OK,
        "fetched",
        Value::Array(rows),
    ))
}

async fn do_create(
    state: &AppState,
    target: Target,
    body: Value,
) -> Result<EnvelopeResponse, AppError> {
    let spec = target.table()?;
    let doc = body_to_doc(body)?;
    let row = CrudService::create(&state.pool, spec, &doc).await?;
    Ok(encode_response(&state.codec, StatusCode::CREATED, "created", row))
}

async fn do_bulk_create(
    state: &AppState,
    target: Target,
    body: Value,
) -> Result<EnvelopeResponse, AppError> {
    let spec = target.table()?;
    let docs = match body {
        Value::Array(arr) => arr
            .into_iter()
            .map(body_to_doc)
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(AppError::BadRequest("body must be a JSON array".into())),
    };
    let rows = CrudService::create_many(&state.pool, spec, &docs).await?;
    Ok(encode_response(
        &state.codec,
        StatusCode::CREATED,
        "created",
        Value::Array(rows),
    ))
}

async fn do_read(
    state: &AppState,
    target: Target,
    id_str: &str,
) -> Result<EnvelopeResponse, AppError> {
    let spec = target.table()?;
    let id = parse_id(id_str)?;
    let row = CrudService::read(&state.pool, spec, id)
        .await?
        .ok_or_else(|| AppError::NotFound(id_str.to_string()))?;
    Ok(encode_response(&state.codec, StatusCode::OK, "fetched", row))
}

async fn do_update(
    state: &AppState,
    target: Target,
    id_str: &str,
    body: Value,
) -> Result<EnvelopeResponse, AppError> {
    let spec = target.table()?;
    let id = parse_id(id_str)?;
    let patch = body_to_doc(body)?;
    let row = CrudService::update(&state.pool, spec, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound(id_str.to_string()))?;
    Ok(encode_response(&state.codec, StatusCode::OK, "updated", row))
}

async fn do_delete(
    state: &AppState,
    target: Target,
    id_str: &str,
) -> Result<EnvelopeResponse, AppError> {
    let spec = target.table()?;
    let id = parse_id(id_str)?;
    let row = CrudService::delete(&state.pool, spec, id)
        .await?
        .ok_or_else(|| AppError::NotFound(id_str.to_string()))?;
    Ok(encode_response(&state.codec, StatusCode::OK, "deleted", row))
}

// Dynamic routes: entity name from the path segment.

pub async fn list(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::FromRoute, Some(&table_name));
    do_list(&state, target, params).await
}

pub async fn create(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    DecryptedJson(body): DecryptedJson,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::FromRoute, Some(&table_name));
    do_create(&state, target, body).await
}

pub async fn bulk_create(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    DecryptedJson(body): DecryptedJson,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::FromRoute, Some(&table_name));
    do_bulk_create(&state, target, body).await
}

pub async fn read(
    State(state): State<AppState>,
    Path((table_name, id_str)): Path<(String, String)>,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::FromRoute, Some(&table_name));
    do_read(&state, target, &id_str).await
}

pub async fn update(
    State(state): State<AppState>,
    Path((table_name, id_str)): Path<(String, String)>,
    DecryptedJson(body): DecryptedJson,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::FromRoute, Some(&table_name));
    do_update(&state, target, &id_str, body).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path((table_name, id_str)): Path<(String, String)>,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::FromRoute, Some(&table_name));
    do_delete(&state, target, &id_str).await
}

// Bound routes: entity fixed at setup time via router Extension.

pub async fn list_bound(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::Fixed(kind), None);
    do_list(&state, target, params).await
}

pub async fn create_bound(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    DecryptedJson(body): DecryptedJson,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::Fixed(kind), None);
    do_create(&state, target, body).await
}

pub async fn read_bound(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Path(id_str): Path<String>,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::Fixed(kind), None);
    do_read(&state, target, &id_str).await
}

pub async fn update_bound(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Path(id_str): Path<String>,
    DecryptedJson(body): DecryptedJson,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::Fixed(kind), None);
    do_update(&state, target, &id_str, body).await
}

pub async fn delete_bound(
    State(state): State<AppState>,
    Extension(kind): Extension<EntityKind>,
    Path(id_str): Path<String>,
) -> Result<EnvelopeResponse, AppError> {
    let target = dispatch::resolve(&state.registry, Binding::Fixed(kind), None);
    do_delete(&state, target, &id_str).await
}
