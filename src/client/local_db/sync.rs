//! # Sync Metadata Operations
//!
//! SQLite implementation of the action queue plus the small key/value table
//! the sync machinery uses to remember when it was last online and last
//! completed a drain.
//!
//! A queued row that no longer decodes is moved to `quarantined_actions` the
//! first time it is read, so one bad row cannot stall every later drain.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::client::error::{StoreError, StoreResult};
use crate::client::local_db::LocalDatabase;
use crate::client::offline::queue::{check_payload, ActionStore};
use crate::shared::{ActionKind, PendingAction};

const LAST_ONLINE_KEY: &str = "last_online";
const LAST_SYNC_KEY: &str = "last_sync";

#[async_trait]
impl ActionStore for LocalDatabase {
    async fn enqueue(&self, kind: ActionKind, payload: serde_json::Value) -> StoreResult<PendingAction> {
        check_payload(&payload, self.max_payload_bytes())?;

        let mut action = PendingAction::new(kind, payload, 0);
        let data = serde_json::to_string(&action.payload)?;

        let result = sqlx::query(
            "INSERT INTO pending_actions (id, kind, payload, created_at, attempts)
             VALUES (?, ?, ?, ?, 0)",
        )
        .bind(action.id.to_string())
        .bind(kind.as_str())
        .bind(&data)
        .bind(action.timestamp.to_rfc3339())
        .execute(self.pool())
        .await?;

        action.seq = result.last_insert_rowid();
        tracing::debug!("Queued {} action {} (seq {})", kind, action.id, action.seq);
        Ok(action)
    }

    async fn dequeue_all(&self) -> StoreResult<Vec<PendingAction>> {
        let rows = sqlx::query(
            "SELECT seq, id, kind, payload, created_at, attempts, last_error
             FROM pending_actions
             ORDER BY seq ASC",
        )
        .fetch_all(self.pool())
        .await?;

        let mut actions = Vec::with_capacity(rows.len());
        for row in &rows {
            match row_to_action(row) {
                Ok(action) => actions.push(action),
                Err(StoreError::Corrupt { id, reason }) => {
                    let seq: i64 = row.try_get("seq")?;
                    self.quarantine(seq, &reason).await?;
                    tracing::warn!("Quarantined undecodable action {} (seq {}): {}", id, seq, reason);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(actions)
    }

    async fn remove(&self, id: &Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM pending_actions WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> StoreResult<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_actions")
            .fetch_one(self.pool())
            .await?;
        Ok(count as usize)
    }

    async fn record_failure(&self, id: &Uuid, error: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE pending_actions SET
                attempts = attempts + 1,
                last_attempt = ?,
                last_error = ?
             WHERE id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(error)
        .bind(id.to_string())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn clear(&self) -> StoreResult<usize> {
        let result = sqlx::query("DELETE FROM pending_actions")
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() as usize)
    }
}

/// A queue row that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedAction {
    pub seq: i64,
    /// Raw id column; may itself be the malformed part
    pub id: String,
    pub kind: String,
    pub payload: String,
    pub reason: String,
    pub quarantined_at: String,
}

/// Decode one queue row
fn row_to_action(row: &SqliteRow) -> StoreResult<PendingAction> {
    let raw_id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&raw_id).map_err(|e| StoreError::corrupt(&raw_id, e))?;

    let kind_name: String = row.try_get("kind")?;
    let kind = ActionKind::parse(&kind_name)
        .ok_or_else(|| StoreError::corrupt(&raw_id, format!("unknown kind '{}'", kind_name)))?;

    let data: String = row.try_get("payload")?;
    let payload = serde_json::from_str(&data).map_err(|e| StoreError::corrupt(&raw_id, e))?;

    let created_at: String = row.try_get("created_at")?;
    let timestamp = parse_timestamp(&created_at).ok_or_else(|| StoreError::corrupt(&raw_id, "bad created_at"))?;

    let attempts: i64 = row.try_get("attempts")?;

    Ok(PendingAction {
        id,
        kind,
        payload,
        timestamp,
        seq: row.try_get("seq")?,
        attempts: attempts.max(0) as u32,
        last_error: row.try_get("last_error")?,
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

impl LocalDatabase {
    async fn quarantine(&self, seq: i64, reason: &str) -> StoreResult<()> {
        let mut tx = self.pool().begin().await?;
        sqlx::query(
            "INSERT OR REPLACE INTO quarantined_actions
                (seq, id, kind, payload, created_at, reason, quarantined_at)
             SELECT seq, id, kind, payload, created_at, ?, ?
             FROM pending_actions WHERE seq = ?",
        )
        .bind(reason)
        .bind(Utc::now().to_rfc3339())
        .bind(seq)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM pending_actions WHERE seq = ?")
            .bind(seq)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Rows pulled out of the queue because they no longer decode, oldest first
    pub async fn quarantined_actions(&self) -> StoreResult<Vec<QuarantinedAction>> {
        let rows = sqlx::query(
            "SELECT seq, id, kind, payload, reason, quarantined_at
             FROM quarantined_actions
             ORDER BY seq ASC",
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(QuarantinedAction {
                    seq: row.try_get("seq")?,
                    id: row.try_get("id")?,
                    kind: row.try_get("kind")?,
                    payload: row.try_get("payload")?,
                    reason: row.try_get("reason")?,
                    quarantined_at: row.try_get("quarantined_at")?,
                })
            })
            .collect()
    }

    /// Drop a quarantined row for good; returns whether it existed
    pub async fn discard_quarantined(&self, seq: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM quarantined_actions WHERE seq = ?")
            .bind(seq)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set sync metadata
    pub async fn set_sync_metadata(&self, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO sync_metadata (key, value, updated_at)
             VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Get sync metadata
    pub async fn get_sync_metadata(&self, key: &str) -> StoreResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM sync_metadata WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    /// When the device was last known to be online
    pub async fn last_online(&self) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self
            .get_sync_metadata(LAST_ONLINE_KEY)
            .await?
            .as_deref()
            .and_then(parse_timestamp))
    }

    pub async fn set_last_online(&self, at: DateTime<Utc>) -> StoreResult<()> {
        self.set_sync_metadata(LAST_ONLINE_KEY, &at.to_rfc3339()).await
    }

    /// When the last drain cycle finished
    pub async fn last_sync(&self) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self
            .get_sync_metadata(LAST_SYNC_KEY)
            .await?
            .as_deref()
            .and_then(parse_timestamp))
    }

    pub async fn set_last_sync(&self, at: DateTime<Utc>) -> StoreResult<()> {
        self.set_sync_metadata(LAST_SYNC_KEY, &at.to_rfc3339()).await
    }
}
