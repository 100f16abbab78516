//! Wire shapes for the admin HTTP surface (§6). Kept distinct from
//! `store::Schedule` because the admin surface's JSON casing (`Key`,
//! `StartAt`, `EndAt`, `Capacity`) is a stable external contract while
//! the store's internal field names are free to follow Rust
//! conventions.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use store::Schedule;

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleDto {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "StartAt")]
    pub start_at: DateTime<Utc>,
    #[serde(rename = "EndAt")]
    pub end_at: DateTime<Utc>,
    #[serde(rename = "Capacity")]
    pub capacity: f64,
}

impl From<Schedule> for ScheduleDto {
    fn from(s: Schedule) -> Self {
        Self {
            key: s.key,
            start_at: s.start_at,
            end_at: s.end_at,
            capacity: s.capacity,
        }
    }
}

/// `POST /schedules` request body: no `Key`, the server assigns one.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScheduleRequest {
    #[serde(rename = "StartAt")]
    pub start_at: DateTime<Utc>,
    #[serde(rename = "EndAt")]
    pub end_at: DateTime<Utc>,
    #[serde(rename = "Capacity")]
    pub capacity: f64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteScheduleQuery {
    pub key: Option<String>,
}
