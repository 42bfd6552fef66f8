//! Single-file JSON record store.
//!
//! The whole persisted state lives in one [`Document`] that is read and
//! written in full on every operation. A [`Db`] handle owns the file path and
//! a read-write lock shared by all of its clones:
//!
//! - [`Db::load`] holds the read lock while reading the file.
//! - [`Db::save`] holds the write lock while truncating and rewriting it.
//! - [`Db::update`] holds the write lock across load, mutate and save, so two
//!   concurrent mutations can never overwrite each other.
//!
//! Repository operations for chirps, users and revoked tokens are implemented
//! on [`Db`] in the sibling modules.

mod chirps;
mod error;
mod tokens;
mod users;

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};

use crate::models::{Chirp, UserRecord};

pub use error::{DbError, Result};

/// Schema version stamped on every saved document.
pub const SCHEMA_VERSION: u32 = 1;

/// Longest password bcrypt can hash without truncating it.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Minimum JSON that parses as an empty document.
const EMPTY_DOCUMENT: &[u8] = b"{}";

/// Complete persisted state.
///
/// Every field carries an explicit default so that files written by older
/// versions (or containing just `{}`) load as an empty-but-valid document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub schema_version: u32,
    /// Highest chirp id ever handed out.
    #[serde(default)]
    pub last_chirp_id: u64,
    /// Highest user id ever handed out.
    #[serde(default)]
    pub last_user_id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub chirps: BTreeMap<u64, Chirp>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: BTreeMap<u64, UserRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub revoked_tokens: BTreeMap<String, DateTime<Utc>>,
}

impl Document {
    /// Allocates the next chirp id. Ids are never reused, even after deletes.
    pub fn next_chirp_id(&mut self) -> u64 {
        let highest = self.chirps.keys().next_back().copied().unwrap_or(0);
        self.last_chirp_id = self.last_chirp_id.max(highest) + 1;
        self.last_chirp_id
    }

    /// Allocates the next user id.
    pub fn next_user_id(&mut self) -> u64 {
        let highest = self.users.keys().next_back().copied().unwrap_or(0);
        self.last_user_id = self.last_user_id.max(highest) + 1;
        self.last_user_id
    }

    pub fn user_by_id(&self, id: u64) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    pub fn user_by_id_mut(&mut self, id: u64) -> Option<&mut UserRecord> {
        self.users.get_mut(&id)
    }

    /// Linear scan; emails are compared case-sensitively.
    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.values().find(|user| user.email == email)
    }
}

/// Treats an explicit `null` the same as a missing key.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Handle to the on-disk document. Clones share the same lock.
#[derive(Debug, Clone)]
pub struct Db {
    path: PathBuf,
    lock: Arc<RwLock<()>>,
    hash_cost: u32,
}

impl Db {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(RwLock::new(())),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Sets the bcrypt work factor used for new password hashes.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Makes sure the database file exists, creating it with `{}` if needed.
    pub async fn ensure(&self) -> Result<()> {
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }
        let _guard = self.lock.write().await;
        self.ensure_unlocked().await
    }

    /// Reads the whole document under the shared lock.
    pub async fn load(&self) -> Result<Document> {
        self.ensure().await?;
        let _guard = self.lock.read().await;
        self.read_unlocked().await
    }

    /// Replaces the whole document under the exclusive lock.
    pub async fn save(&self, document: &Document) -> Result<()> {
        let data = encode(document)?;
        let _guard = self.lock.write().await;
        fs::write(&self.path, data).await?;
        Ok(())
    }

    /// Runs one load-mutate-save cycle while holding the exclusive lock.
    ///
    /// If `mutate` fails nothing is written and its error is returned.
    pub async fn update<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Document) -> Result<T>,
    {
        let _guard = self.lock.write().await;
        self.ensure_unlocked().await?;
        let mut document = self.read_unlocked().await?;
        let value = mutate(&mut document)?;
        fs::write(&self.path, encode(&document)?).await?;
        Ok(value)
    }

    async fn ensure_unlocked(&self) -> Result<()> {
        let created = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await;

        match created {
            Ok(mut file) => {
                file.write_all(EMPTY_DOCUMENT).await?;
                file.flush().await?;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_unlocked(&self) -> Result<Document> {
        let data = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

fn encode(document: &Document) -> Result<Vec<u8>> {
    let mut document = document.clone();
    document.schema_version = SCHEMA_VERSION;
    Ok(serde_json::to_vec_pretty(&document)?)
}

#[cfg(test)]
pub(crate) fn test_db(dir: &tempfile::TempDir) -> Db {
    Db::new(dir.path().join("database.json")).with_hash_cost(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_creates_minimal_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        db.ensure().await.unwrap();
        let contents = std::fs::read_to_string(db.path()).unwrap();
        assert_eq!(contents, "{}");

        // A second call leaves the existing file alone.
        std::fs::write(db.path(), r#"{"last_chirp_id": 3}"#).unwrap();
        db.ensure().await.unwrap();
        assert_eq!(db.load().await.unwrap().last_chirp_id, 3);
    }

    #[tokio::test]
    async fn missing_or_empty_file_loads_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        assert_eq!(db.load().await.unwrap(), Document::default());

        std::fs::write(db.path(), "{}").unwrap();
        assert_eq!(db.load().await.unwrap(), Document::default());
    }

    #[tokio::test]
    async fn null_collections_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);
        std::fs::write(
            db.path(),
            r#"{"chirps": null, "users": null, "revoked_tokens": null}"#,
        )
        .unwrap();

        let document = db.load().await.unwrap();
        assert!(document.chirps.is_empty());
        assert!(document.users.is_empty());
        assert!(document.revoked_tokens.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);
        std::fs::write(db.path(), "{ not json").unwrap();

        assert!(matches!(db.load().await, Err(DbError::Serialization(_))));
        assert!(matches!(
            db.update(|_| Ok(())).await,
            Err(DbError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn unreadable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::new(dir.path().join("missing").join("database.json"));

        assert!(matches!(db.load().await, Err(DbError::Io(_))));
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        let mut document = Document::default();
        let id = document.next_chirp_id();
        document.chirps.insert(
            id,
            Chirp {
                id,
                body: "hello world".into(),
                author_id: 2,
            },
        );
        let user_id = document.next_user_id();
        document.users.insert(
            user_id,
            UserRecord {
                id: user_id,
                email: "alice@example.com".into(),
                password_hash: "hash".into(),
                is_upgraded: true,
            },
        );
        document
            .revoked_tokens
            .insert("token".into(), Utc::now());

        db.save(&document).await.unwrap();
        let loaded = db.load().await.unwrap();

        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        assert_eq!(loaded.chirps, document.chirps);
        assert_eq!(loaded.users, document.users);
        assert_eq!(loaded.revoked_tokens, document.revoked_tokens);
        assert_eq!(loaded.last_chirp_id, 1);
        assert_eq!(loaded.last_user_id, 1);
    }

    #[tokio::test]
    async fn failed_update_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        let result: Result<()> = db
            .update(|document| {
                document.next_chirp_id();
                Err(DbError::UserNotFound)
            })
            .await;

        assert!(matches!(result, Err(DbError::UserNotFound)));
        assert_eq!(db.load().await.unwrap().last_chirp_id, 0);
    }

    #[test]
    fn id_allocation_respects_existing_keys() {
        let mut document: Document =
            serde_json::from_str(r#"{"chirps": {"4": {"id": 4, "body": "x", "author_id": 1}}}"#)
                .unwrap();

        assert_eq!(document.next_chirp_id(), 5);
        assert_eq!(document.next_chirp_id(), 6);
    }
}
