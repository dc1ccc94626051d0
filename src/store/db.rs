//! SQLite operations for profiles and generation history.

use std::path::Path;

use chrono::{NaiveDate, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use uuid::Uuid;

use super::models::{DATE_FORMAT, GenerationRow, ProfileRow};
use crate::types::{DataError, GenerationId, NewGeneration, Tier, UserId};

/// Shared handle on the relational store. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create the database at the given path.
    pub async fn open(db_path: &Path) -> Result<Self, DataError> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DataError::Configuration(format!(
                    "cannot create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), DataError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                tier TEXT NOT NULL DEFAULT 'free',
                generations_today INTEGER NOT NULL DEFAULT 0,
                last_generation_date TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS generations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                original_content TEXT NOT NULL,
                tone TEXT NOT NULL,
                platforms TEXT NOT NULL,
                results TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_generations_user ON generations(user_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ==================== Profile Operations ====================

    /// Fetch a profile, creating a free-tier one on first sight.
    pub async fn ensure_profile(&self, user_id: UserId) -> Result<ProfileRow, DataError> {
        sqlx::query("INSERT OR IGNORE INTO profiles (user_id) VALUES (?)")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    /// Find a profile without creating it.
    pub async fn find_profile(&self, user_id: UserId) -> Result<Option<ProfileRow>, DataError> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Set the tier flag, creating the profile if needed.
    pub async fn set_tier(&self, user_id: UserId, tier: Tier) -> Result<(), DataError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, tier) VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET tier = excluded.tier
            "#,
        )
        .bind(user_id.to_string())
        .bind(tier.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record one generation on `today` and return the new count.
    ///
    /// Single statement: increments when the stored date is `today`, otherwise
    /// restarts the counter at 1 and moves the date forward.
    pub async fn commit_generation(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<u32, DataError> {
        let today = today.format(DATE_FORMAT).to_string();

        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE profiles SET
                generations_today = CASE
                    WHEN last_generation_date = ?1 THEN generations_today + 1
                    ELSE 1
                END,
                last_generation_date = ?1
            WHERE user_id = ?2
            RETURNING generations_today
            "#,
        )
        .bind(&today)
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let count = count.ok_or_else(|| DataError::NotFound(format!("profile {}", user_id)))?;

        u32::try_from(count).map_err(|_| DataError::Corrupt(format!("generation count {}", count)))
    }

    // ==================== Generation Operations ====================

    /// Insert a generation and return the stored row.
    pub async fn insert_generation(&self, input: &NewGeneration) -> Result<GenerationRow, DataError> {
        let row = GenerationRow {
            id: Uuid::now_v7().to_string(),
            user_id: input.user_id.to_string(),
            original_content: input.original_content.clone(),
            tone: input.tone.id().to_string(),
            platforms: serde_json::to_string(&input.platforms)?,
            results: serde_json::to_string(&input.results)?,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        sqlx::query(
            r#"
            INSERT INTO generations (
                id, user_id, original_content, tone, platforms, results, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.original_content)
        .bind(&row.tone)
        .bind(&row.platforms)
        .bind(&row.results)
        .bind(&row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(row)
    }

    /// List a user's generations, newest first.
    pub async fn list_generations(&self, user_id: UserId) -> Result<Vec<GenerationRow>, DataError> {
        let rows = sqlx::query_as::<_, GenerationRow>(
            "SELECT * FROM generations WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete a generation if `user_id` owns it. Returns rows removed.
    pub async fn delete_generation(
        &self,
        user_id: UserId,
        id: GenerationId,
    ) -> Result<u64, DataError> {
        let result = sqlx::query("DELETE FROM generations WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
