// ============================================================================
// CHIRPY - SHORT POSTS BACKED BY A SINGLE JSON FILE
// ============================================================================

// - User signup/login with bcrypt password hashing
// - Access and refresh JWTs with a persistent revocation ledger
// - Chirp create/list/get/delete with author-only deletes
// - Lock-guarded JSON file store
// - Profanity masking and input validation
// - Structured logging

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod models;
pub mod moderation;
pub mod routes;
pub mod states;

pub use config::Config;
pub use states::AppState;
