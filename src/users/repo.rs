use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::users::repo_types::{Account, AccountRow, InsertAccount};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record already exists")]
    AlreadyExists,
    #[error("record not found")]
    NotFound,
    #[error("malformed structured column: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Store(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::AlreadyExists,
            _ => RepoError::Store(e),
        }
    }
}

/// Persistence seam for accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn insert(&self, account: &InsertAccount) -> Result<i64, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Account, RepoError>;
    /// Matches username or email.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Account, RepoError>;
    async fn update(&self, id: i64, username: &str, email: &str) -> Result<(), RepoError>;
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
    /// Full scan, no pagination.
    async fn list_all(&self) -> Result<Vec<Account>, RepoError>;
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, username, email, password, first_name, last_name, date_of_birth, gender,
           phone_number, street, city, state, postal_code, country, profile_picture_url,
           roles, preferences, created_at
    FROM users
"#;

#[derive(Clone)]
pub struct PgAccountRepository {
    db: PgPool,
}

impl PgAccountRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn insert(&self, a: &InsertAccount) -> Result<i64, RepoError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password, first_name, last_name, date_of_birth,
                               gender, phone_number, street, city, state, postal_code, country,
                               profile_picture_url, roles, preferences)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(&a.username)
        .bind(&a.email)
        .bind(&a.password_hash)
        .bind(&a.first_name)
        .bind(&a.last_name)
        .bind(a.date_of_birth)
        .bind(&a.gender)
        .bind(&a.phone_number)
        .bind(&a.street)
        .bind(&a.city)
        .bind(&a.state)
        .bind(&a.postal_code)
        .bind(&a.country)
        .bind(&a.profile_picture_url)
        .bind(&a.roles)
        .bind(&a.preferences)
        .fetch_one(&self.db)
        .await?;
        debug!(user_id = id, "user row inserted");
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Account, RepoError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(RepoError::NotFound)?;
        Ok(Account::try_from(row)?)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Account, RepoError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "{SELECT_COLUMNS} WHERE email = $1 OR username = $1 ORDER BY id LIMIT 1"
        ))
        .bind(identifier)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound)?;
        Ok(Account::try_from(row)?)
    }

    async fn update(&self, id: i64, username: &str, email: &str) -> Result<(), RepoError> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET username = $1, email = $2
             WHERE id = $3
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(id)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Account>, RepoError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.db)
            .await?;
        rows.into_iter()
            .map(|r| Account::try_from(r).map_err(RepoError::from))
            .collect()
    }
}
