//! InMemoryStatusStore
//! -------------------
//! A `Mutex`-guarded in-process implementation of `StatusStore`, grounded
//! in `session::manager::SessionManager`'s `Arc<Mutex<HashMap<...>>>`
//! caching pattern. Used by the engine's own test suite and by the admin
//! surface's integration tests; never by the production binary.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::model::{MetricsSnapshot, Schedule, Timer};
use crate::traits::StatusStore;

#[derive(Default)]
struct Inner {
    cooldown_ends_at: Option<DateTime<Utc>>,
    schedules: HashMap<String, Schedule>,
    timers: HashMap<String, DateTime<Utc>>,
    metrics: MetricsSnapshot,
}

pub struct InMemoryStatusStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }
}

impl Default for InMemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn store_cooldown_ends_at(&self, t: DateTime<Utc>) -> Result<(), StoreError> {
        self.inner.lock().await.cooldown_ends_at = Some(t);
        Ok(())
    }

    async fn fetch_cooldown_ends_at(&self) -> Result<DateTime<Utc>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .cooldown_ends_at
            .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap()))
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, StoreError> {
        Ok(self.inner.lock().await.schedules.values().cloned().collect())
    }

    async fn add_schedule(&self, schedule: Schedule) -> Result<(), StoreError> {
        self.inner
            .lock()
            .await
            .schedules
            .insert(schedule.key.clone(), schedule);
        Ok(())
    }

    async fn remove_schedule(&self, key: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().await;
        guard
            .schedules
            .remove(key)
            .ok_or_else(|| StoreError::ScheduleNotFound(key.to_string()))?;
        Ok(())
    }

    async fn update_timer(&self, name: &str, fire_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.inner.lock().await.timers.insert(name.to_string(), fire_at);
        Ok(())
    }

    async fn delete_timer(&self, name: &str) -> Result<(), StoreError> {
        self.inner.lock().await.timers.remove(name);
        Ok(())
    }

    async fn get_expired_timer_names(&self, now: DateTime<Utc>) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .timers
            .iter()
            .filter(|(_, fire_at)| **fire_at <= now)
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn store_metrics(&self, metrics: MetricsSnapshot) -> Result<(), StoreError> {
        self.inner.lock().await.metrics.extend(metrics);
        Ok(())
    }

    async fn get_metrics(&self) -> Result<MetricsSnapshot, StoreError> {
        Ok(self.inner.lock().await.metrics.clone())
    }

    async fn list_timers(&self) -> Result<Vec<Timer>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .timers
            .iter()
            .map(|(name, fire_at)| Timer {
                name: name.clone(),
                fire_at: *fire_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn default_cooldown_is_epoch() {
        let s = InMemoryStatusStore::new();
        assert_eq!(s.fetch_cooldown_ends_at().await.unwrap().timestamp(), 0);
    }

    #[tokio::test]
    async fn schedule_add_list_remove_roundtrips() {
        let s = InMemoryStatusStore::new();
        let sched = Schedule::new(
            Utc.timestamp_opt(100, 0).unwrap(),
            Utc.timestamp_opt(200, 0).unwrap(),
            5.0,
        );
        s.add_schedule(sched.clone()).await.unwrap();
        assert_eq!(s.list_schedules().await.unwrap(), vec![sched.clone()]);
        s.remove_schedule(&sched.key).await.unwrap();
        assert!(s.list_schedules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn timers_expire_by_fire_at() {
        let s = InMemoryStatusStore::new();
        s.update_timer("t1", Utc.timestamp_opt(100, 0).unwrap())
            .await
            .unwrap();
        let expired = s
            .get_expired_timer_names(Utc.timestamp_opt(200, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(expired, vec!["t1".to_string()]);
    }
}
