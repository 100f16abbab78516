//! SqliteStatusStore
//! -----------------
//! SQLite-backed implementation of `StatusStore`. Schema creation runs on
//! connect, mirroring `session::store::SQLiteSessionStore`'s
//! `CREATE TABLE IF NOT EXISTS` + `INSERT ... ON CONFLICT DO UPDATE`
//! upsert idiom. Four tables replace the original Redis layout
//! (original_source `lib/status_store.go`): a single-row `cooldown`
//! table, `schedules`, `timers`, and `metrics`.
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{Row, SqlitePool};

use crate::error::StoreError;
use crate::model::{MetricsSnapshot, Schedule, Timer};
use crate::traits::StatusStore;

fn to_millis(t: DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| StoreError::Corrupt(format!("invalid timestamp {ms}")))
}

pub struct SqliteStatusStore {
    pool: SqlitePool,
}

impl SqliteStatusStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and ensure schema exists.
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(path).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cooldown (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                ends_at_ms INTEGER NOT NULL
            );
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schedules (
                key TEXT PRIMARY KEY,
                start_at_ms INTEGER NOT NULL,
                end_at_ms INTEGER NOT NULL,
                capacity REAL NOT NULL
            );
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS timers (
                name TEXT PRIMARY KEY,
                fire_at_ms INTEGER NOT NULL
            );
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metrics (
                name TEXT PRIMARY KEY,
                value REAL NOT NULL
            );
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StatusStore for SqliteStatusStore {
    async fn store_cooldown_ends_at(&self, t: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cooldown (id, ends_at_ms) VALUES (0, ?)
            ON CONFLICT(id) DO UPDATE SET ends_at_ms = excluded.ends_at_ms;
        "#,
        )
        .bind(to_millis(t))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn fetch_cooldown_ends_at(&self) -> Result<DateTime<Utc>, StoreError> {
        let row = sqlx::query("SELECT ends_at_ms FROM cooldown WHERE id = 0")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match row {
            Some(row) => from_millis(row.get::<i64, _>("ends_at_ms")),
            None => Ok(DateTime::<Utc>::from_timestamp(0, 0).unwrap()),
        }
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, StoreError> {
        let rows = sqlx::query("SELECT key, start_at_ms, end_at_ms, capacity FROM schedules")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Schedule {
                key: row.get("key"),
                start_at: from_millis(row.get("start_at_ms"))?,
                end_at: from_millis(row.get("end_at_ms"))?,
                capacity: row.get("capacity"),
            });
        }
        Ok(out)
    }

    async fn add_schedule(&self, schedule: Schedule) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO schedules (key, start_at_ms, end_at_ms, capacity)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                start_at_ms = excluded.start_at_ms,
                end_at_ms = excluded.end_at_ms,
                capacity = excluded.capacity;
        "#,
        )
        .bind(&schedule.key)
        .bind(to_millis(schedule.start_at))
        .bind(to_millis(schedule.end_at))
        .bind(schedule.capacity)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn remove_schedule(&self, key: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM schedules WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ScheduleNotFound(key.to_string()));
        }
        Ok(())
    }

    async fn update_timer(&self, name: &str, fire_at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO timers (name, fire_at_ms) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET fire_at_ms = excluded.fire_at_ms;
        "#,
        )
        .bind(name)
        .bind(to_millis(fire_at))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn delete_timer(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM timers WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn get_expired_timer_names(&self, now: DateTime<Utc>) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT name FROM timers WHERE fire_at_ms <= ?")
            .bind(to_millis(now))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }

    async fn store_metrics(&self, metrics: MetricsSnapshot) -> Result<(), StoreError> {
        for (name, value) in metrics {
            sqlx::query(
                r#"
                INSERT INTO metrics (name, value) VALUES (?, ?)
                ON CONFLICT(name) DO UPDATE SET value = excluded.value;
            "#,
            )
            .bind(name)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        Ok(())
    }

    async fn get_metrics(&self) -> Result<MetricsSnapshot, StoreError> {
        let rows = sqlx::query("SELECT name, value FROM metrics")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("name"), row.get("value")))
            .collect())
    }

    async fn list_timers(&self) -> Result<Vec<Timer>, StoreError> {
        let rows = sqlx::query("SELECT name, fire_at_ms FROM timers")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Timer {
                name: row.get("name"),
                fire_at: from_millis(row.get("fire_at_ms"))?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStatusStore {
        SqliteStatusStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn cooldown_defaults_to_epoch() {
        let s = store().await;
        assert_eq!(s.fetch_cooldown_ends_at().await.unwrap().timestamp(), 0);
    }

    #[tokio::test]
    async fn cooldown_roundtrips() {
        let s = store().await;
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        s.store_cooldown_ends_at(t).await.unwrap();
        assert_eq!(s.fetch_cooldown_ends_at().await.unwrap(), t);
    }

    #[tokio::test]
    async fn schedules_roundtrip_and_delete() {
        let s = store().await;
        let sched = Schedule::new(
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            Utc.timestamp_opt(1_700_003_600, 0).unwrap(),
            42.0,
        );
        s.add_schedule(sched.clone()).await.unwrap();
        let all = s.list_schedules().await.unwrap();
        assert_eq!(all, vec![sched.clone()]);

        s.remove_schedule(&sched.key).await.unwrap();
        assert!(s.list_schedules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removing_unknown_schedule_errors() {
        let s = store().await;
        let err = s.remove_schedule("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::ScheduleNotFound(_)));
    }

    #[tokio::test]
    async fn expired_timers_are_found_by_name() {
        let s = store().await;
        let past = Utc.timestamp_opt(1_000, 0).unwrap();
        let future = Utc.timestamp_opt(9_999_999_999, 0).unwrap();
        s.update_timer("past", past).await.unwrap();
        s.update_timer("future", future).await.unwrap();

        let now = Utc.timestamp_opt(2_000, 0).unwrap();
        let expired = s.get_expired_timer_names(now).await.unwrap();
        assert_eq!(expired, vec!["past".to_string()]);

        s.delete_timer("past").await.unwrap();
        assert!(s
            .get_expired_timer_names(Utc.timestamp_opt(9_999_999_999, 0).unwrap())
            .await
            .unwrap()
            .contains(&"future".to_string()));
    }

    #[tokio::test]
    async fn metrics_roundtrip_and_overwrite() {
        let s = store().await;
        s.store_metrics(MetricsSnapshot::from([("spot_capacity".to_string(), 10.0)]))
            .await
            .unwrap();
        s.store_metrics(MetricsSnapshot::from([("spot_capacity".to_string(), 12.0)]))
            .await
            .unwrap();

        let metrics = s.get_metrics().await.unwrap();
        assert_eq!(metrics.get("spot_capacity"), Some(&12.0));
    }
}
