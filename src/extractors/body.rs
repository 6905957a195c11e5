//! Request-body extractor that transparently decrypts `{ "cypher": ... }`
//! payloads from trusted clients.
//!
//! Bodies without the `cypher` field pass through unchanged (pre-flight and
//! API-documentation traffic never encrypts). A body that claims to be
//! encrypted but cannot be decrypted rejects with a 400 envelope; it never
//! becomes a process-level failure.

use crate::codec::CodecError;
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde_json::Value;

/// Field carrying the ciphertext token in encrypted request bodies.
pub const CYPHER_FIELD: &str = "cypher";

/// The decoded request body: decrypted when it arrived encrypted, verbatim
/// otherwise.
#[derive(Debug)]
pub struct DecryptedJson(pub Value);

#[async_trait]
impl FromRequest<AppState> for DecryptedJson {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::BadRequest("could not read request body".into()))?;
        if bytes.is_empty() {
            return Ok(DecryptedJson(Value::Null));
        }
        let raw: Value = serde_json::from_slice(&bytes)
            .map_err(|_| AppError::BadRequest("body must be valid JSON".into()))?;
        let token = match raw.get(CYPHER_FIELD) {
            None => return Ok(DecryptedJson(raw)),
            Some(Value::String(t)) => t.clone(),
            Some(_) => return Err(AppError::Codec(CodecError::Malformed)),
        };
        let plain = state.codec.decrypt_value(&token)?;
        Ok(DecryptedJson(plain))
    }
}
