use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::Database;

/// Credential and role record. The password hash never leaves this module
/// except through `password_hash` reads by the auth service; the serialized
/// form omits it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let role_raw: String = row.try_get("role")?;
        let role = Role::parse(&role_raw).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: format!("unknown role: {role_raw}").into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Emails are case-normalized to lowercase on write and lookup.
    pub async fn create(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let email = new_user.email.trim().to_lowercase();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(&email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        self.fetch(&id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn fetch(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(User::from_row).transpose()
    }

    pub async fn fetch_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(User::from_row).transpose()
    }

    pub async fn list(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(User::from_row).collect()
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(self.db.pool())
            .await?;
        row.try_get("n")
    }
}
