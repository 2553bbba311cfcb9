use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::users::repo_types::{NewUser, User};

/// Advisory lock key serializing id assignment across connections.
const USER_ID_LOCK: i64 = 0x7573_6572_5f69_64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Inserts the user under `max(id) + 1` (or 1) and returns the new id.
    async fn create(&self, user: NewUser) -> Result<i64, StoreError>;
    /// Returns how many records were removed; zero is not an error.
    async fn delete_by_email(&self, email: &str) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, country, city, created_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, country, city, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<i64, StoreError> {
        let mut tx = self.db.begin().await?;

        // Held until commit/rollback, so max(id) cannot be read twice concurrently.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(USER_ID_LOCK)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (id, email, password_hash, name, country, city)
            SELECT COALESCE(MAX(id), 0) + 1, $1, $2, $3, $4, $5
            FROM users
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.country)
        .bind(&user.city)
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::DuplicateEmail(user.email));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        debug!(user_id = id, "user row inserted");
        Ok(id)
    }

    async fn delete_by_email(&self, email: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
