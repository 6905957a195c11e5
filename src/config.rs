//! Service configuration, read once at startup and threaded explicitly.
//!
//! The payload secret is `Option<String>` on purpose: a missing secret is a
//! supported degraded mode (plaintext responses), not an implicit branch
//! buried at each call site.

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: String,
    pub payload_secret: Option<String>,
}

impl AppConfig {
    /// Load from the environment (and `.env` if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/atelier".into());
        let listen_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let payload_secret = std::env::var("PAYLOAD_SECRET")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        AppConfig {
            database_url,
            listen_addr,
            payload_secret,
        }
    }
}
