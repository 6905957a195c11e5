//! Entity CRUD routes.
//!
//! `entity_routes` mounts the dynamic `/:table_name/...` surface; the
//! dispatcher normalizes whatever name arrives in that segment.
//! `bound_entity_routes` mounts the same handlers with a fixed entity
//! binding for stable, named mounts like `/courses`.

use crate::handlers::entity::{
    bulk_create, create, create_bound, delete as delete_handler, delete_bound, list, list_bound,
    read, read_bound, update, update_bound,
};
use crate::registry::EntityKind;
use crate::state::AppState;
use axum::{routing::get, routing::post, Extension, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:table_name", get(list).post(create))
        .route("/:table_name/bulk", post(bulk_create))
        .route(
            "/:table_name/:id",
            get(read).patch(update).delete(delete_handler),
        )
        .with_state(state)
}

/// Routes operating on one fixed entity, no matter what the path says.
pub fn bound_entity_routes(state: AppState, kind: EntityKind) -> Router {
    Router::new()
        .route("/", get(list_bound).post(create_bound))
        .route(
            "/:id",
            get(read_bound).patch(update_bound).delete(delete_bound),
        )
        .layer(Extension(kind))
        .with_state(state)
}
