use crate::domain::ports::LocalStorage;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const UPSERT: &str = r#"INSERT INTO local_storage (key, value, updated_at)
    VALUES (?, ?, ?)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#;

/// One row per storage key in the `local_storage` table.
pub struct SqliteLocalStorage {
    pool: SqlitePool,
}

impl SqliteLocalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocalStorage for SqliteLocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Storage)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(AppError::Storage)?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Storage)?;
        let now = Utc::now().to_rfc3339();
        for (key, value) in entries {
            sqlx::query(UPSERT)
                .bind(*key)
                .bind(value.as_str())
                .bind(now.as_str())
                .execute(&mut *tx)
                .await
                .map_err(AppError::Storage)?;
        }
        tx.commit().await.map_err(AppError::Storage)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(AppError::Storage)?;
        Ok(())
    }
}
