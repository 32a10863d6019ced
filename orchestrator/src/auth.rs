use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use password_hash::SaltString;
use rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::entity::service_user;

#[derive(Debug)]
pub enum AuthError {
    NotFound,
    InvalidPassword,
    Inactive,
    Db(sea_orm::DbErr),
    Hash(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NotFound => write!(f, "User not found"),
            AuthError::InvalidPassword => write!(f, "Invalid password"),
            AuthError::Inactive => write!(f, "User is inactive"),
            AuthError::Db(e) => write!(f, "Database error: {e}"),
            AuthError::Hash(e) => write!(f, "Hash error: {e}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Credential store for dashboard users.
pub struct Auth {
    db: DatabaseConnection,
}

impl Auth {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Expose the underlying connection for direct SeaORM queries.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Verify username/password and stamp `last_login_at` on success.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<service_user::Model, AuthError> {
        let user = service_user::Entity::find()
            .filter(service_user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AuthError::Db)?
            .ok_or(AuthError::NotFound)?;

        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        let hash =
            PasswordHash::new(&user.password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| AuthError::InvalidPassword)?;

        let mut active: service_user::ActiveModel = user.clone().into();
        active.last_login_at = Set(Some(Utc::now().naive_utc()));
        active.update(&self.db).await.map_err(AuthError::Db)?;

        Ok(user)
    }

    /// Create a user with an Argon2id-hashed password.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<service_user::Model, AuthError> {
        let password_hash = Self::hash_password(password)?;
        let now = Utc::now().naive_utc();
        service_user::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(username.to_owned()),
            password_hash: Set(password_hash),
            is_admin: Set(is_admin),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(AuthError::Db)
    }

    pub async fn count_users(&self) -> Result<u64, AuthError> {
        service_user::Entity::find()
            .count(&self.db)
            .await
            .map_err(AuthError::Db)
    }

    /// Hash a plaintext password with Argon2id + a random salt.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> Auth {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Auth::new(db)
    }

    #[tokio::test]
    async fn test_hash_produces_argon2_format() {
        let hash = Auth::hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"), "expected PHC string: {hash}");
    }

    #[tokio::test]
    async fn test_hash_unique_per_call() {
        let h1 = Auth::hash_password("same").unwrap();
        let h2 = Auth::hash_password("same").unwrap();
        assert_ne!(h1, h2, "random salt must vary the hash");
    }

    #[tokio::test]
    async fn test_create_user_stores_hash_not_plaintext() {
        let auth = setup().await;
        let user = auth.create_user("alice", "supersecret", false).await.unwrap();
        assert_ne!(user.password_hash, "supersecret");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_create_user_increments_count() {
        let auth = setup().await;
        assert_eq!(auth.count_users().await.unwrap(), 0);
        auth.create_user("alice", "pw1", false).await.unwrap();
        auth.create_user("bob", "pw2", true).await.unwrap();
        assert_eq!(auth.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_errors() {
        let auth = setup().await;
        auth.create_user("alice", "pw", false).await.unwrap();
        assert!(auth.create_user("alice", "other", false).await.is_err());
    }

    #[tokio::test]
    async fn test_authenticate_success_and_last_login() {
        let auth = setup().await;
        let created = auth.create_user("alice", "correct", true).await.unwrap();
        assert!(created.last_login_at.is_none());

        let user = auth.authenticate("alice", "correct").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.is_admin);

        let row = service_user::Entity::find_by_id(created.id)
            .one(auth.db())
            .await
            .unwrap()
            .unwrap();
        assert!(row.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_rejected() {
        let auth = setup().await;
        auth.create_user("alice", "correct", false).await.unwrap();
        let err = auth.authenticate("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidPassword));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user_rejected() {
        let auth = setup().await;
        let err = auth.authenticate("nobody", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn test_authenticate_inactive_user_rejected() {
        let auth = setup().await;
        let user = auth.create_user("alice", "pw", false).await.unwrap();

        let mut active: service_user::ActiveModel = user.into();
        active.is_active = Set(false);
        active.update(auth.db()).await.unwrap();

        let err = auth.authenticate("alice", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Inactive));
    }
}
