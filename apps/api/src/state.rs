use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Gemini client in production, a scripted generator in tests.
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
    /// Signs the interview and admin session cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derives the 64-byte cookie signing key from `SESSION_SECRET`.
pub fn cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret.as_bytes())[..])
}

#[cfg(test)]
pub fn test_state(db: SqlitePool, llm: Arc<dyn TextGenerator>) -> AppState {
    let config = Config::for_tests();
    AppState {
        db,
        llm,
        cookie_key: cookie_key(&config.session_secret),
        config,
    }
}
