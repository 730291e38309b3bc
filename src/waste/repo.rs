use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::{
    auth::repo_types::UserId,
    db::StoreError,
    waste::{
        category::WasteCategory,
        repo_types::{EntryId, HistoryFilter, WasteEntry, WasteEntryRow},
    },
};

/// Waste history storage. Entries are append-only.
#[async_trait]
pub trait WasteStore: Send + Sync {
    /// Fails with [`StoreError::UnknownUser`] when `user_id` has no account.
    async fn record(
        &self,
        user_id: UserId,
        category: WasteCategory,
        timestamp: PrimitiveDateTime,
    ) -> Result<EntryId, StoreError>;

    /// Entries owned by `user_id` that pass `filter`, oldest first (ties by id).
    async fn history(
        &self,
        user_id: UserId,
        filter: &HistoryFilter,
    ) -> Result<Vec<WasteEntry>, StoreError>;
}

#[derive(Clone)]
pub struct PgWasteStore {
    db: PgPool,
}

impl PgWasteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WasteStore for PgWasteStore {
    async fn record(
        &self,
        user_id: UserId,
        category: WasteCategory,
        timestamp: PrimitiveDateTime,
    ) -> Result<EntryId, StoreError> {
        let res = sqlx::query_scalar::<_, EntryId>(
            r#"
            INSERT INTO waste_entries (user_id, category, timestamp)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(category.as_str())
        .bind(timestamp)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(StoreError::UnknownUser(user_id))
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert waste entry").into()),
        }
    }

    async fn history(
        &self,
        user_id: UserId,
        filter: &HistoryFilter,
    ) -> Result<Vec<WasteEntry>, StoreError> {
        let rows = sqlx::query_as::<_, WasteEntryRow>(
            r#"
            SELECT id, user_id, category, timestamp
              FROM waste_entries
             WHERE user_id = $1
             ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list waste history")?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = WasteEntry::try_from(row)?;
            if filter.matches(&entry) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
