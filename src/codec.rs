//! Symmetric payload codec: AES-256-GCM-SIV over JSON text.
//!
//! Ciphertext token format:
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)>
//! ```
//!
//! The `v1` prefix leaves room for algorithm or key migration without
//! breaking tokens already held by clients. Both sides of the wire are
//! operated by us, so key agreement is out of band (shared config secret).

use aes_gcm_siv::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm_siv::{Aes256GcmSiv, Key, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

const TOKEN_PREFIX: &str = "v1";
const NONCE_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("payload encryption is not configured")]
    Disabled,
    #[error("ciphertext is not a valid token")]
    Malformed,
    #[error("payload could not be decrypted")]
    Decrypt,
    #[error("decrypted payload is not valid JSON")]
    NotJson,
}

/// Holds the cipher when a shared secret is configured. Absent secret is the
/// explicit degraded mode: responses go out in plaintext and encrypted
/// request bodies are rejected as client errors.
pub struct PayloadCodec {
    cipher: Option<Aes256GcmSiv>,
}

impl PayloadCodec {
    /// Derive the 256-bit key from the configured secret string via SHA-256.
    pub fn new(secret: Option<&str>) -> Self {
        let cipher = secret.map(|s| {
            let digest = Sha256::digest(s.as_bytes());
            let key = Key::<Aes256GcmSiv>::from_slice(&digest);
            Aes256GcmSiv::new(key)
        });
        if cipher.is_none() {
            tracing::warn!("no payload secret configured; running in plaintext mode");
        }
        PayloadCodec { cipher }
    }

    pub fn disabled() -> Self {
        PayloadCodec { cipher: None }
    }

    pub fn is_active(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CodecError> {
        let cipher = self.cipher.as_ref().ok_or(CodecError::Disabled)?;
        let nonce = Aes256GcmSiv::generate_nonce(&mut OsRng);
        let ct = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CodecError::Decrypt)?;
        Ok(format!(
            "{}.{}.{}",
            TOKEN_PREFIX,
            URL_SAFE_NO_PAD.encode(nonce),
            URL_SAFE_NO_PAD.encode(ct)
        ))
    }

    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CodecError> {
        let cipher = self.cipher.as_ref().ok_or(CodecError::Disabled)?;
        let mut parts = token.splitn(3, '.');
        let (prefix, nonce_b64, ct_b64) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(n), Some(c)) => (p, n, c),
            _ => return Err(CodecError::Malformed),
        };
        if prefix != TOKEN_PREFIX {
            return Err(CodecError::Malformed);
        }
        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(nonce_b64)
            .map_err(|_| CodecError::Malformed)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CodecError::Malformed);
        }
        let ct = URL_SAFE_NO_PAD
            .decode(ct_b64)
            .map_err(|_| CodecError::Malformed)?;
        let nonce = Nonce::from_slice(&nonce_bytes);
        cipher
            .decrypt(nonce, ct.as_ref())
            .map_err(|_| CodecError::Decrypt)
    }

    /// Serialize a JSON value and encrypt it to a token.
    pub fn encrypt_value(&self, value: &Value) -> Result<String, CodecError> {
        let text = serde_json::to_vec(value).map_err(|_| CodecError::NotJson)?;
        self.encrypt(&text)
    }

    /// Decrypt a token and parse the plaintext as JSON.
    pub fn decrypt_value(&self, token: &str) -> Result<Value, CodecError> {
        let plain = self.decrypt(token)?;
        serde_json::from_slice(&plain).map_err(|_| CodecError::NotJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codec() -> PayloadCodec {
        PayloadCodec::new(Some("unit-test-secret"))
    }

    #[test]
    fn round_trip_json_values() {
        let c = codec();
        for v in [
            json!({"a": 1}),
            json!([1, 2, 3]),
            json!("plain string"),
            json!(null),
            json!({"nested": {"deep": [true, false]}}),
        ] {
            let token = c.encrypt_value(&v).unwrap();
            assert!(token.starts_with("v1."));
            assert_eq!(c.decrypt_value(&token).unwrap(), v);
        }
    }

    #[test]
    fn tokens_are_nondeterministic() {
        let c = codec();
        let v = json!({"a": 1});
        let t1 = c.encrypt_value(&v).unwrap();
        let t2 = c.encrypt_value(&v).unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn garbage_token_is_malformed_not_panic() {
        let c = codec();
        assert!(matches!(c.decrypt("garbage"), Err(CodecError::Malformed)));
        assert!(matches!(c.decrypt("v1.!!!.???"), Err(CodecError::Malformed)));
        assert!(matches!(c.decrypt("v2.AAAA.AAAA"), Err(CodecError::Malformed)));
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let token = codec().encrypt_value(&json!({"a": 1})).unwrap();
        let other = PayloadCodec::new(Some("different-secret"));
        assert!(matches!(other.decrypt(&token), Err(CodecError::Decrypt)));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let c = codec();
        let token = c.encrypt_value(&json!({"a": 1})).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(c.decrypt(&tampered).is_err());
    }

    #[test]
    fn disabled_codec_refuses_both_directions() {
        let c = PayloadCodec::disabled();
        assert!(!c.is_active());
        assert!(matches!(c.encrypt(b"x"), Err(CodecError::Disabled)));
        assert!(matches!(c.decrypt("v1.a.b"), Err(CodecError::Disabled)));
    }
}
