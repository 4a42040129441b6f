use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::connection::DatabaseManager;
use crate::database::models::SeenArticle;
use crate::error::StoreError;
use crate::utils::logging::{log_database_error, log_database_operation};

/// Durable set of article ids that have already been delivered.
#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn has_seen(&self, article_id: &str) -> Result<bool, StoreError>;

    /// Marks an article as delivered. Marking a known id is a no-op.
    async fn mark_seen(&self, article_id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn seen_count(&self) -> Result<i64, StoreError>;
}

/// [`DedupStore`] backed by the `seen_articles` table.
#[derive(Clone)]
pub struct SqliteDedupStore {
    db: DatabaseManager,
}

impl SqliteDedupStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    async fn has_seen(&self, article_id: &str) -> Result<bool, StoreError> {
        SeenArticle::exists(&self.db.pool, article_id)
            .await
            .map_err(|e| {
                log_database_error("SELECT", "seen_articles", &e.to_string(), Some(article_id));
                StoreError::from(e)
            })
    }

    async fn mark_seen(&self, article_id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        let inserted = SeenArticle::insert_if_absent(&self.db.pool, article_id, seen_at)
            .await
            .map_err(|e| {
                log_database_error("INSERT", "seen_articles", &e.to_string(), Some(article_id));
                StoreError::from(e)
            })?;
        let details = if inserted {
            format!("{} marked seen", article_id)
        } else {
            format!("{} already seen", article_id)
        };
        log_database_operation("INSERT", "seen_articles", Some(&details));
        Ok(())
    }

    async fn seen_count(&self) -> Result<i64, StoreError> {
        Ok(SeenArticle::count(&self.db.pool).await?)
    }
}
