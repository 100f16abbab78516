use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{MetricsSnapshot, Schedule, Timer};

/// The Status Store contract (§4.8): persistent state shared by the
/// reconciler and the admin surface. Per-call atomicity only — no
/// multi-call transactions are required. Missing cooldown maps to the
/// epoch, never an error.
///
/// Mirrors `session::store::SessionStore`'s trait-plus-impl shape: one
/// narrow `async_trait` the engine and the admin surface both depend on,
/// with a SQLite-backed implementation and an in-memory one for tests.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn store_cooldown_ends_at(&self, t: DateTime<Utc>) -> Result<(), StoreError>;

    /// Epoch if unset; never errors on a missing key.
    async fn fetch_cooldown_ends_at(&self) -> Result<DateTime<Utc>, StoreError>;

    async fn list_schedules(&self) -> Result<Vec<Schedule>, StoreError>;

    async fn add_schedule(&self, schedule: Schedule) -> Result<(), StoreError>;

    async fn remove_schedule(&self, key: &str) -> Result<(), StoreError>;

    /// Arm (or re-arm) a named timer. Arming overwrites any existing
    /// `fire_at` for the same name.
    async fn update_timer(&self, name: &str, fire_at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn delete_timer(&self, name: &str) -> Result<(), StoreError>;

    /// Names of all timers whose `fire_at <= now`.
    async fn get_expired_timer_names(&self, now: DateTime<Utc>) -> Result<Vec<String>, StoreError>;

    async fn store_metrics(&self, metrics: MetricsSnapshot) -> Result<(), StoreError>;

    async fn get_metrics(&self) -> Result<MetricsSnapshot, StoreError>;

    async fn list_timers(&self) -> Result<Vec<Timer>, StoreError>;
}
