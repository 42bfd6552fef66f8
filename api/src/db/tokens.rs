use chrono::Utc;

use super::{Db, Result};

impl Db {
    /// Records `token` as revoked. Revoking the same token again is a no-op
    /// and keeps the original timestamp.
    pub async fn revoke_token(&self, token: &str) -> Result<()> {
        self.update(|document| {
            document
                .revoked_tokens
                .entry(token.to_string())
                .or_insert_with(Utc::now);
            Ok(())
        })
        .await
    }

    pub async fn is_token_revoked(&self, token: &str) -> Result<bool> {
        let document = self.load().await?;
        Ok(document.revoked_tokens.contains_key(token))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_db;

    #[tokio::test]
    async fn revoke_marks_token() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        assert!(!db.is_token_revoked("abc").await.unwrap());
        db.revoke_token("abc").await.unwrap();
        assert!(db.is_token_revoked("abc").await.unwrap());
        assert!(!db.is_token_revoked("abd").await.unwrap());
    }

    #[tokio::test]
    async fn revoking_twice_keeps_first_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        db.revoke_token("abc").await.unwrap();
        let first = db.load().await.unwrap().revoked_tokens["abc"];

        db.revoke_token("abc").await.unwrap();
        let document = db.load().await.unwrap();
        assert_eq!(document.revoked_tokens.len(), 1);
        assert_eq!(document.revoked_tokens["abc"], first);
    }
}
