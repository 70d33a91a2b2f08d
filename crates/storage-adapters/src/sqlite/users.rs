use async_trait::async_trait;
use domains::{DomainResult, User, UserRepository};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_uuid, SqliteStore};
use crate::error::StorageResult;

fn user_from_row(row: &SqliteRow) -> StorageResult<User> {
    Ok(User {
        id: parse_uuid("users", &row.try_get::<String, _>("id")?)?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

impl SqliteStore {
    async fn insert_user(&self, user: &User) -> StorageResult<()> {
        sqlx::query("INSERT INTO users (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn select_user(&self, column: &'static str, value: String) -> StorageResult<Option<User>> {
        let sql = format!("SELECT id, username, email, password_hash, created_at FROM users WHERE {column} = ?");
        sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn create(&self, user: &User) -> DomainResult<()> {
        Ok(self.insert_user(user).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.select_user("id", id.to_string()).await?)
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.select_user("email", email.to_string()).await?)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.delete_user(id).await?)
    }
}
