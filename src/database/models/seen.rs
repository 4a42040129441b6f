use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An article that has been delivered at least once.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SeenArticle {
    pub article_id: String,
    pub first_seen_at: String,
}

impl SeenArticle {
    /// Records the article unless it is already known.
    ///
    /// Returns `true` when a new row was written. An existing row keeps its
    /// original `first_seen_at`.
    pub async fn insert_if_absent(
        pool: &sqlx::SqlitePool,
        article_id: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO seen_articles (article_id, first_seen_at) VALUES (?, ?)
             ON CONFLICT(article_id) DO NOTHING",
        )
        .bind(article_id)
        .bind(seen_at.to_rfc3339())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &sqlx::SqlitePool, article_id: &str) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM seen_articles WHERE article_id = ?",
        )
        .bind(article_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn find(
        pool: &sqlx::SqlitePool,
        article_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SeenArticle>(
            "SELECT article_id, first_seen_at FROM seen_articles WHERE article_id = ?",
        )
        .bind(article_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM seen_articles")
            .fetch_one(pool)
            .await
    }

    /// Seen counts grouped by the source tag prefix of the id.
    pub async fn count_by_source(pool: &sqlx::SqlitePool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT
                CASE WHEN instr(article_id, ':') > 0
                     THEN substr(article_id, 1, instr(article_id, ':') - 1)
                     ELSE 'unknown' END AS source,
                COUNT(*) AS seen
             FROM seen_articles
             GROUP BY source
             ORDER BY source",
        )
        .fetch_all(pool)
        .await
    }

    pub fn first_seen(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.first_seen_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
