use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One entry of the `Timers` config map (§6), kept separate from the
/// timer's fire command (owned by `engine::EngineConfig::timers`, which
/// only needs the name to look up a command when it fires).
///
/// Mirrors the original's `config/timer.go` `Timer{Command, After,
/// Duration}`: `key` is the timer's own name, `after` names the event
/// that arms it (e.g. `"LaunchingInstances"`), `duration` is how far
/// into the future it fires once armed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRule {
    pub key: String,
    pub after: String,
    #[serde(with = "humantime_duration")]
    pub duration: Duration,
}

impl TimerRule {
    pub fn new(key: impl Into<String>, after: impl Into<String>, duration: Duration) -> Self {
        Self {
            key: key.into(),
            after: after.into(),
            duration,
        }
    }
}

/// Serializes `Duration` as a YAML/JSON string like `"5m"`, matching how
/// the original's `Duration string` field is parsed with
/// `time.ParseDuration`. Kept local to this module since it's the only
/// place in the crate that needs it.
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_yaml() {
        let rule = TimerRule::new("launchingInstances", "LaunchingInstances", Duration::from_secs(300));
        let yaml = serde_yaml::to_string(&rule).unwrap();
        let back: TimerRule = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.key, rule.key);
        assert_eq!(back.duration, rule.duration);
    }
}
