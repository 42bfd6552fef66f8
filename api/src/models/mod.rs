mod chirp;
mod user;

pub use chirp::Chirp;
pub use user::{User, UserRecord};
