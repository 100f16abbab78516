//! Pure gating checks evaluated before a tick commits to scaling work.
//! No async, no IO — mirrors `check_session_eligibility`'s shape: a pure
//! function from observed state to a small result enum.
use chrono::{DateTime, Utc};

use store::Schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownGate {
    Clear,
    Active,
}

/// §4.4 step 6: stop the tick if still within cooldown.
pub fn check_cooldown(now: DateTime<Utc>, cooldown_ends_at: DateTime<Utc>) -> CooldownGate {
    if now < cooldown_ends_at {
        CooldownGate::Active
    } else {
        CooldownGate::Clear
    }
}

/// §4.4 step 7, §9 "Schedule resolution with overlaps": of the schedules
/// active at `now`, pick the one with the largest `start_at`. Multiple
/// active schedules are tolerated; ties are not expected (callers should
/// treat identical `start_at` values as a configuration bug) but are
/// resolved arbitrarily rather than panicking, since schedule data is
/// user-supplied at runtime, not a programming invariant.
pub fn resolve_active_schedule(schedules: &[Schedule], now: DateTime<Utc>) -> Option<&Schedule> {
    schedules
        .iter()
        .filter(|s| s.is_active_at(now))
        .max_by_key(|s| s.start_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn cooldown_blocks_before_expiry() {
        assert_eq!(check_cooldown(t(10), t(20)), CooldownGate::Active);
    }

    #[test]
    fn cooldown_clears_at_expiry() {
        assert_eq!(check_cooldown(t(20), t(20)), CooldownGate::Clear);
    }

    #[test]
    fn resolve_active_schedule_picks_most_recent_start() {
        let older = Schedule {
            key: "a".into(),
            start_at: t(0),
            end_at: t(100),
            capacity: 10.0,
        };
        let newer = Schedule {
            key: "b".into(),
            start_at: t(50),
            end_at: t(100),
            capacity: 20.0,
        };
        let resolved = resolve_active_schedule(&[older, newer.clone()], t(60));
        assert_eq!(resolved, Some(&newer));
    }

    #[test]
    fn resolve_active_schedule_ignores_expired_and_future() {
        let expired = Schedule {
            key: "a".into(),
            start_at: t(0),
            end_at: t(50),
            capacity: 10.0,
        };
        let future = Schedule {
            key: "b".into(),
            start_at: t(200),
            end_at: t(300),
            capacity: 20.0,
        };
        assert_eq!(resolve_active_schedule(&[expired, future], t(100)), None);
    }
}
