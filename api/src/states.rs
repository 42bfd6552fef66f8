use crate::{auth::TokenService, config::Config, db::Db};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::{
    path::PathBuf,
    sync::{Arc, atomic::AtomicUsize},
};

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Cheap to clone: every field is a handle.
///
/// `Db` clones share one read-write lock, so all handlers serialize their
/// writes to the database file through it.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub tokens: TokenService,
    /// Process-wide throttle on login attempts.
    pub login_limiter: Arc<DefaultDirectRateLimiter>,
    pub fileserver_hits: Arc<AtomicUsize>,
    pub fileserver_root: PathBuf,
    pub polka_api_key: Option<String>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let db = Db::new(&config.database_path).with_hash_cost(config.bcrypt_cost);
        let tokens = TokenService::new(&config.jwt_secret, db.clone());

        Self {
            db,
            tokens,
            login_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(
                config.login_attempts_per_minute,
            ))),
            fileserver_hits: Arc::new(AtomicUsize::new(0)),
            fileserver_root: config.fileserver_root.clone(),
            polka_api_key: config.polka_api_key.clone(),
        }
    }
}
