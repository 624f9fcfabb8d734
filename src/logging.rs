use std::cmp::Ordering;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};

use serde::Deserialize;
use serde_json::{Map, Number, Value};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
        }
    }

    fn from_rank(rank: u8) -> Self {
        if rank == 0 {
            Self::Debug
        } else {
            Self::Info
        }
    }

    fn as_log_level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
        }
    }
}

// Written once at start-up from the site config.
static MIN_LEVEL: AtomicU8 = AtomicU8::new(1);

pub fn set_min_level(level: LogLevel) {
    MIN_LEVEL.store(level.rank(), AtomicOrdering::Relaxed);
}

pub fn min_level() -> LogLevel {
    LogLevel::from_rank(MIN_LEVEL.load(AtomicOrdering::Relaxed))
}

/// Builds the JSON line for one event. `fields` entries are merged into
/// the top-level object after `ts`, `level` and `event`.
pub fn event_payload(ts_millis: u64, level: LogLevel, event: &str, fields: Value) -> Value {
    let mut payload = Map::new();
    payload.insert("ts".to_string(), Value::Number(Number::from(ts_millis)));
    payload.insert("level".to_string(), Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), Value::String(event.to_string()));

    if let Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    Value::Object(payload)
}

pub fn log_event(level: LogLevel, event: &str, fields: Value) {
    if level < min_level() {
        return;
    }

    let payload = event_payload(now_millis(), level, event, fields);
    log::log!(level.as_log_level(), "{payload}");
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_merges_fields_after_envelope() {
        let payload = event_payload(
            42,
            LogLevel::Info,
            "form_rejected",
            json!({ "form": "contact", "reason": "invalid_email" }),
        );

        assert_eq!(
            payload,
            json!({
                "ts": 42,
                "level": "info",
                "event": "form_rejected",
                "form": "contact",
                "reason": "invalid_email",
            })
        );
    }

    #[test]
    fn non_object_fields_are_ignored() {
        let payload = event_payload(1, LogLevel::Debug, "tick", json!("loose"));

        assert_eq!(payload.as_object().map(|map| map.len()), Some(3));
    }

    #[test]
    fn debug_ranks_below_info() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert_eq!(LogLevel::from_rank(LogLevel::Debug.rank()), LogLevel::Debug);
    }
}
