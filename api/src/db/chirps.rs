use super::{Db, Result};
use crate::models::Chirp;

impl Db {
    /// Stores a new chirp. The body is saved as given; validation and
    /// cleaning happen before this is called.
    pub async fn create_chirp(&self, body: &str, author_id: u64) -> Result<Chirp> {
        self.update(|document| {
            let chirp = Chirp {
                id: document.next_chirp_id(),
                body: body.to_string(),
                author_id,
            };
            document.chirps.insert(chirp.id, chirp.clone());
            Ok(chirp)
        })
        .await
    }

    pub async fn get_chirp(&self, id: u64) -> Result<Option<Chirp>> {
        let document = self.load().await?;
        Ok(document.chirps.get(&id).cloned())
    }

    /// All chirps in storage order. Callers sort as needed.
    pub async fn list_chirps(&self) -> Result<Vec<Chirp>> {
        let document = self.load().await?;
        Ok(document.chirps.into_values().collect())
    }

    pub async fn list_chirps_by_author(&self, author_id: u64) -> Result<Vec<Chirp>> {
        let chirps = self.list_chirps().await?;
        Ok(chirps
            .into_iter()
            .filter(|chirp| chirp.author_id == author_id)
            .collect())
    }

    /// Removes a chirp. Returns `false` when no chirp has that id.
    pub async fn delete_chirp(&self, id: u64) -> Result<bool> {
        let document = self.load().await?;
        if !document.chirps.contains_key(&id) {
            return Ok(false);
        }

        // Re-checked under the write lock; another delete may have won.
        self.update(|document| Ok(document.chirps.remove(&id).is_some()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_db;

    #[tokio::test]
    async fn create_then_get_returns_same_chirp() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        let created = db.create_chirp("Something really interesting", 5).await.unwrap();
        assert_eq!(created.id, 1);

        let found = db.get_chirp(created.id).await.unwrap().unwrap();
        assert_eq!(found.body, "Something really interesting");
        assert_eq!(found.author_id, 5);
    }

    #[tokio::test]
    async fn get_missing_chirp_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        assert!(db.get_chirp(42).await.unwrap().is_none());
        db.create_chirp("first", 1).await.unwrap();
        assert!(db.get_chirp(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_author() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        assert!(db.list_chirps().await.unwrap().is_empty());

        db.create_chirp("one", 1).await.unwrap();
        db.create_chirp("two", 2).await.unwrap();
        db.create_chirp("three", 1).await.unwrap();

        assert_eq!(db.list_chirps().await.unwrap().len(), 3);

        let by_one = db.list_chirps_by_author(1).await.unwrap();
        assert_eq!(by_one.len(), 2);
        assert!(by_one.iter().all(|chirp| chirp.author_id == 1));
        assert!(db.list_chirps_by_author(9).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_chirp_existed() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        assert!(!db.delete_chirp(1).await.unwrap());

        let chirp = db.create_chirp("hello world", 1).await.unwrap();
        assert!(db.delete_chirp(chirp.id).await.unwrap());
        assert!(db.get_chirp(chirp.id).await.unwrap().is_none());
        assert!(!db.delete_chirp(chirp.id).await.unwrap());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        db.create_chirp("one", 1).await.unwrap();
        let second = db.create_chirp("two", 1).await.unwrap();
        db.delete_chirp(second.id).await.unwrap();

        let third = db.create_chirp("three", 1).await.unwrap();
        assert_eq!(third.id, 3);

        db.delete_chirp(1).await.unwrap();
        db.delete_chirp(3).await.unwrap();
        assert_eq!(db.create_chirp("four", 1).await.unwrap().id, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_keep_every_write() {
        let dir = tempfile::tempdir().unwrap();
        let db = test_db(&dir);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move { db.create_chirp(&format!("chirp {i}"), 1).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
        assert_eq!(db.list_chirps().await.unwrap().len(), 20);
    }
}
