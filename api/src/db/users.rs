use super::{Db, DbError, MAX_PASSWORD_BYTES, Result};
use crate::models::{User, UserRecord};

impl Db {
    /// Registers a user. Fails with [`DbError::EmailInUse`] if the email is taken.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = self.hash_password(password).await?;

        self.update(|document| {
            if document.user_by_email(email).is_some() {
                return Err(DbError::EmailInUse);
            }

            let record = UserRecord {
                id: document.next_user_id(),
                email: email.to_string(),
                password_hash,
                is_upgraded: false,
            };
            let user = User::from(&record);
            document.users.insert(record.id, record);
            Ok(user)
        })
        .await
    }

    pub async fn get_user(&self, id: u64) -> Result<Option<User>> {
        let document = self.load().await?;
        Ok(document.user_by_id(id).map(User::from))
    }

    /// Checks an email/password pair.
    ///
    /// Returns [`DbError::UserNotFound`] or [`DbError::InvalidPassword`] so the
    /// caller can log the real reason; both should look the same to clients.
    pub async fn validate_credentials(&self, email: &str, password: &str) -> Result<User> {
        let document = self.load().await?;
        let record = document
            .user_by_email(email)
            .ok_or(DbError::UserNotFound)?;

        // Nothing longer than bcrypt's limit was ever stored.
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(DbError::InvalidPassword);
        }

        let password = password.to_string();
        let hash = record.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || bcrypt::non_truncating_verify(password, &hash))
                .await??;
        if !matches {
            return Err(DbError::InvalidPassword);
        }

        Ok(User::from(record))
    }

    /// Updates email and/or password. An empty string leaves that field alone.
    pub async fn update_user(&self, id: u64, email: &str, password: &str) -> Result<User> {
        let password_hash = if password.is_empty() {
            None
        } else {
            Some(self.hash_password(password).await?)
        };

        self.update(|document| {
            if document.user_by_id(id).is_none() {
                return Err(DbError::UserNotFound);
            }
            if !email.is_empty() {
                if let Some(other) = document.user_by_email(email) {
                    if other.id != id {
                        return Err(DbError::EmailInUse);
                    }
                }
            }

            let record = document.user_by_id_mut(id).ok_or(DbError::UserNotFound)?;
            if !email.is_empty() {
                record.email = email.to_string();
            }
            if let Some(hash) = password_hash {
                record.password_hash = hash;
            }
            Ok(User::from(&*record))
        })
        .await
    }

    /// Marks a user as upgraded. Calling it again is a no-op.
    pub async fn upgrade_user(&self, id: u64) -> Result<User> {
        self.update(|document| {
            let record = document.user_by_id_mut(id).ok_or(DbError::UserNotFound)?;
            record.is_upgraded = true;
            Ok(User::from(&*record))
        })
        .await
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(DbError::PasswordTooLong);
        }

        let password = password.to_string();
        let cost = self.hash_cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::non_truncating_hash(password, cost)).await??)
    }
}
