use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::AppResult,
    models::{RankedEntry, UserHistory},
    services::HistoryStore,
};

/// Creates a PostgreSQL connection pool
///
/// Fails fast when the database is unreachable so the caller can decide to
/// run without history.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// History store backed by PostgreSQL
///
/// Writes into tables owned and migrated outside this service:
///
/// ```sql
/// user_history (id BIGSERIAL PRIMARY KEY, username TEXT, age SMALLINT,
///               gender TEXT, skin_type TEXT, category TEXT, created_at TIMESTAMPTZ)
/// item_recommend (user_id BIGINT REFERENCES user_history(id), product_name TEXT,
///                 rank_position INT, product_url TEXT)
/// ```
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl HistoryStore for PgHistoryStore {
    async fn save_user_history(&self, history: &UserHistory) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO user_history (username, age, gender, skin_type, category, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&history.username)
        .bind(i16::from(history.age))
        .bind(&history.gender)
        .bind(&history.skin_type)
        .bind(&history.category)
        .bind(history.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn save_recommendations(&self, user_id: i64, entries: &[RankedEntry]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO item_recommend (user_id, product_name, rank_position, product_url)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user_id)
            .bind(&entry.product_name)
            .bind(entry.rank as i32)
            .bind(entry.product_url.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
