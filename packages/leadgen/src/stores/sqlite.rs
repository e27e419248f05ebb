//! SQLite profile store.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{store::ProfileStore, usage::UsageRecorder};
use crate::types::profile::{PlanType, UserProfile};

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

/// SQLite-backed profile store.
pub struct SqliteProfileStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct UserRow {
    email: String,
    plan: String,
    searches_today: i64,
    last_search_date: NaiveDate,
    total_leads_extracted: i64,
    subscription_active: bool,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            email: row.email,
            plan: PlanType::parse(&row.plan).unwrap_or_default(),
            searches_today: u32::try_from(row.searches_today).unwrap_or(0),
            last_search_date: row.last_search_date,
            total_leads_extracted: u64::try_from(row.total_leads_extracted).unwrap_or(0),
            subscription_active: row.subscription_active,
        }
    }
}

impl SqliteProfileStore {
    /// Connect and create the `users` table if needed.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://leadgen.db?mode=rwc` - File-based, created if missing
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        Self::connect(database_url, 5).await
    }

    /// Create an in-memory store (for testing).
    ///
    /// Uses a single connection; each SQLite connection has its own memory
    /// database.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(backend)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY,
                plan TEXT NOT NULL DEFAULT 'free',
                searches_today INTEGER NOT NULL DEFAULT 0,
                last_search_date TEXT NOT NULL,
                total_leads_extracted INTEGER NOT NULL DEFAULT 0,
                subscription_active INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    fn not_found(email: &str) -> StoreError {
        StoreError::ProfileNotFound {
            email: email.to_string(),
        }
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn load_profile(&self, email: &str, today: NaiveDate) -> StoreResult<UserProfile> {
        sqlx::query("INSERT OR IGNORE INTO users (email, last_search_date) VALUES (?, ?)")
            .bind(email)
            .bind(today)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        let row: UserRow = sqlx::query_as(
            r#"
            SELECT email, plan, searches_today, last_search_date,
                   total_leads_extracted, subscription_active
            FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        let mut profile = UserProfile::from(row);
        if profile.roll_over(today) {
            debug!(email = %email, date = %today, "Resetting daily run counter");
            sqlx::query("UPDATE users SET searches_today = 0, last_search_date = ? WHERE email = ?")
                .bind(today)
                .bind(email)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }

        Ok(profile)
    }

    async fn increment_usage(&self, email: &str, leads: usize) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET searches_today = searches_today + 1,
                total_leads_extracted = total_leads_extracted + ?
            WHERE email = ?
            "#,
        )
        .bind(i64::try_from(leads).unwrap_or(i64::MAX))
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(email));
        }
        Ok(())
    }

    async fn upgrade_to_pro(&self, email: &str) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE users SET plan = ?, subscription_active = 1 WHERE email = ?")
                .bind(PlanType::Pro.as_str())
                .bind(email)
                .execute(&self.pool)
                .await
                .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(email));
        }
        Ok(())
    }
}

#[async_trait]
impl UsageRecorder for SqliteProfileStore {
    async fn record_usage(&self, user_id: &str, lead_count: usize) -> StoreResult<()> {
        self.increment_usage(user_id, lead_count).await
    }
}
