use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("status store unavailable: {0}")]
    Unavailable(String),

    #[error("schedule {0} not found")]
    ScheduleNotFound(String),

    #[error("timer {0} not found")]
    TimerNotFound(String),

    #[error("status store data corrupt: {0}")]
    Corrupt(String),
}
