//! Shared application state. Registry and codec are read-only after startup;
//! no request ever mutates process-wide state.

use crate::codec::PayloadCodec;
use crate::registry::ModelRegistry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<ModelRegistry>,
    pub codec: Arc<PayloadCodec>,
}
