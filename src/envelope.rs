//! Uniform response envelope. Every endpoint answers with the same four
//! fields; `data` is ciphertext when a payload secret is configured and
//! plain JSON otherwise, so consumers must handle both.

use crate::codec::PayloadCodec;
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug)]
pub struct Envelope {
    /// Decimal HTTP status code as a string, e.g. "200".
    pub status_code: String,
    pub msg: String,
    pub data: Value,
    pub error: Option<String>,
}

impl Envelope {
    pub fn failure(status: StatusCode, msg: String) -> Envelope {
        Envelope {
            status_code: status.as_u16().to_string(),
            msg: msg.clone(),
            data: Value::Null,
            error: Some(msg),
        }
    }
}

/// Build a success envelope, encrypting `data` when the codec is active.
///
/// An encryption failure is recovered locally into a server-error envelope;
/// an inactive codec degrades to plaintext with a logged warning. Either way
/// the caller gets the same four-field shape back.
pub fn encode_response(
    codec: &PayloadCodec,
    status: StatusCode,
    msg: &str,
    data: Value,
) -> (StatusCode, Json<Envelope>) {
    if !codec.is_active() {
        tracing::warn!("payload secret not configured; sending data in plaintext");
        return (
            status,
            Json(Envelope {
                status_code: status.as_u16().to_string(),
                msg: msg.to_string(),
                data,
                error: None,
            }),
        );
    }
    match codec.encrypt_value(&data) {
        Ok(token) => (
            status,
            Json(Envelope {
                status_code: status.as_u16().to_string(),
                msg: msg.to_string(),
                data: Value::String(token),
                error: None,
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "failed to encrypt response payload");
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            (status, Json(Envelope::failure(status, "internal server error".to_string())))
        }
    }
}
