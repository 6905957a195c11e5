//! Atelier API: content-marketplace REST backend with generic entity CRUD
//! and symmetric payload encryption.
//!
//! The core is three pieces: an immutable [`registry::ModelRegistry`] mapping
//! entity names to storage tables, a [`dispatch`] layer that normalizes name
//! variants and binds the resolved entity to the request, and the
//! [`envelope`]/[`codec`] pair that wraps every response in a uniform
//! four-field shape with optionally encrypted data.

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use codec::{CodecError, PayloadCodec};
pub use config::AppConfig;
pub use dispatch::{Binding, Target};
pub use envelope::{encode_response, Envelope};
pub use error::AppError;
pub use registry::{EntityKind, ModelRegistry, TableSpec};
pub use routes::{bound_entity_routes, common_routes_with_ready, entity_routes};
pub use service::CrudService;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_entity_tables};
