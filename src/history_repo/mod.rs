// SQLite history: one fixed-schema table, append-only, bounded recent-window reads.

use crate::error::StatsError;
use crate::models::{HistoryRecord, NewHistoryRecord};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::instrument;

/// Hard cap on rows per query unless overridden with `with_max_limit`.
pub const DEFAULT_MAX_LIMIT: u32 = 1000;
/// Rows returned by `query(0)`.
pub const DEFAULT_LIMIT: u32 = 100;

pub struct HistoryRepo {
    pool: SqlitePool,
    max_limit: u32,
    /// Last store-assigned timestamp (ms). Held across the insert so ids and
    /// timestamps advance together.
    last_assigned_ts: Mutex<i64>,
}

impl HistoryRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self {
            pool,
            max_limit: DEFAULT_MAX_LIMIT,
            last_assigned_ts: Mutex::new(0),
        })
    }

    pub fn with_max_limit(mut self, max_limit: u32) -> Self {
        self.max_limit = max_limit.max(1);
        self
    }

    pub fn max_limit(&self) -> u32 {
        self.max_limit
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS system_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000),
                cpu REAL NOT NULL,
                memory_percent REAL NOT NULL,
                disk_percent REAL NOT NULL,
                net_up REAL NOT NULL,
                net_down REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_history_created_at ON system_history(created_at)",
        )
        .execute(&self.pool)
        .await?;

        // Carry the timestamp floor across restarts.
        let latest =
            sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(created_at) FROM system_history")
                .fetch_one(&self.pool)
                .await?;
        let mut last_ts = self.last_assigned_ts.lock().await;
        *last_ts = (*last_ts).max(latest.unwrap_or(0));

        Ok(())
    }

    /// Inserts one row. A missing timestamp is assigned here and never goes below
    /// the previous assigned one, even if the wall clock steps back.
    #[instrument(skip(self, record), fields(repo = "history", operation = "append"))]
    pub async fn append(&self, record: &NewHistoryRecord) -> Result<HistoryRecord, StatsError> {
        let mut last_ts = self.last_assigned_ts.lock().await;
        let timestamp = match record.timestamp {
            Some(ts) => ts,
            None => {
                let now = chrono::Utc::now().timestamp_millis();
                let ts = now.max(*last_ts);
                *last_ts = ts;
                ts
            }
        };

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO system_history (created_at, cpu, memory_percent, disk_percent, net_up, net_down)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(timestamp)
        .bind(record.cpu)
        .bind(record.memory_percent)
        .bind(record.disk_percent)
        .bind(record.net_up)
        .bind(record.net_down)
        .fetch_one(&self.pool)
        .await?;

        Ok(HistoryRecord {
            id,
            timestamp,
            cpu: record.cpu,
            memory_percent: record.memory_percent,
            disk_percent: record.disk_percent,
            net_up: record.net_up,
            net_down: record.net_down,
        })
    }

    /// Most recent `limit` rows (0 means `DEFAULT_LIMIT`, capped at max_limit), oldest first.
    #[instrument(skip(self), fields(repo = "history", operation = "query"))]
    pub async fn query(&self, limit: u32) -> Result<Vec<HistoryRecord>, StatsError> {
        let limit = match limit {
            0 => DEFAULT_LIMIT,
            n => n,
        }
        .min(self.max_limit);
        let rows = sqlx::query(
            "SELECT id, created_at, cpu, memory_percent, disk_percent, net_up, net_down
             FROM system_history ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_row(&row)?);
        }
        out.reverse();
        Ok(out)
    }

    /// Deletes every row and restarts the id sequence at 1. Clearing an empty store is a no-op.
    #[instrument(skip(self), fields(repo = "history", operation = "clear"))]
    pub async fn clear(&self) -> Result<u64, StatsError> {
        // Serialize with append so no insert lands between the delete and the sequence reset.
        let _writer = self.last_assigned_ts.lock().await;
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM system_history")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'system_history'")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(deleted)
    }

    pub async fn count(&self) -> Result<u64, StatsError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM system_history")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    /// Closes the pool; later calls fail with a persistence error.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn parse_row(row: &SqliteRow) -> Result<HistoryRecord, StatsError> {
        Ok(HistoryRecord {
            id: row.try_get("id")?,
            timestamp: row.try_get("created_at")?,
            cpu: row.try_get("cpu")?,
            memory_percent: row.try_get("memory_percent")?,
            disk_percent: row.try_get("disk_percent")?,
            net_up: row.try_get("net_up")?,
            net_down: row.try_get("net_down")?,
        })
    }
}

/// Resolves a caller-supplied page size: missing or non-positive -> `default`,
/// above `max` -> `max`. Out-of-range input is clamped, never rejected.
pub fn clamp_limit(requested: Option<i64>, default: u32, max: u32) -> u32 {
    match requested {
        Some(n) if n > 0 => n.min(max as i64) as u32,
        _ => default.min(max),
    }
}
