//! Ring buffer of recent log events, fed by a tracing layer.

use std::collections::VecDeque;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

pub const MAX_LOG_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
    pub fields: Map<String, Value>,
}

static ENTRIES: LazyLock<Mutex<VecDeque<LogEntry>>> =
    LazyLock::new(|| Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES)));

fn entries() -> MutexGuard<'static, VecDeque<LogEntry>> {
    ENTRIES.lock().unwrap_or_else(PoisonError::into_inner)
}

fn severity(level: &str) -> u8 {
    match level {
        "error" => 5,
        "warn" => 4,
        "info" => 3,
        "debug" => 2,
        _ => 1,
    }
}

/// The newest `limit` entries at or above `min_level`, oldest first.
pub fn recent(limit: usize, min_level: Option<&str>) -> Vec<LogEntry> {
    let limit = limit.clamp(1, MAX_LOG_ENTRIES);
    let floor = min_level.map(|l| severity(&l.to_ascii_lowercase())).unwrap_or(0);

    let mut logs: Vec<_> = entries()
        .iter()
        .rev()
        .filter(|e| severity(&e.level) >= floor)
        .take(limit)
        .cloned()
        .collect();
    logs.reverse();
    logs
}

/// Drop everything. Returns how many entries were removed.
pub fn clear() -> usize {
    let mut entries = entries();
    let cleared = entries.len();
    entries.clear();
    cleared
}

fn push(entry: LogEntry) {
    let mut entries = entries();
    if entries.len() >= MAX_LOG_ENTRIES {
        entries.pop_front();
    }
    entries.push_back(entry);
}

/// Records every event that passes the subscriber's filter.
#[derive(Default)]
pub struct LogCaptureLayer;

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // Trace events are not kept.
        if *meta.level() > Level::DEBUG {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        push(LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: meta.level().as_str().to_ascii_lowercase(),
            target: meta.target().to_string(),
            message: visitor.message.unwrap_or_else(|| meta.name().to_string()),
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn record_value(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.into());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, value.to_string().into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_value(field, format!("{value:?}").into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{LazyLock, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    static TEST_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    fn entry(level: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: level.to_string(),
            target: "test".to_string(),
            message: message.to_string(),
            fields: Map::new(),
        }
    }

    #[test]
    fn recent_applies_limit_and_level() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear();
        push(entry("debug", "d0"));
        push(entry("info", "i1"));
        push(entry("warn", "w2"));
        push(entry("error", "e3"));
        push(entry("info", "i4"));

        let logs = recent(2, None);
        assert_eq!(logs.iter().map(|l| l.message.as_str()).collect::<Vec<_>>(), ["e3", "i4"]);

        let logs = recent(10, Some("WARN"));
        assert_eq!(logs.iter().map(|l| l.message.as_str()).collect::<Vec<_>>(), ["w2", "e3"]);

        assert_eq!(clear(), 5);
        assert!(recent(10, None).is_empty());
    }

    #[test]
    fn buffer_is_bounded() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            push(entry("info", &format!("m{i}")));
        }
        let logs = recent(MAX_LOG_ENTRIES, None);
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "m5");
        clear();
    }

    #[test]
    fn layer_captures_message_and_fields() {
        let _guard = TEST_LOCK.lock().unwrap();
        clear();
        let subscriber = tracing_subscriber::registry().with(LogCaptureLayer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(row_id = 7, "Row completed");
            tracing::trace!("too chatty");
        });

        let logs = recent(10, None);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "Row completed");
        assert_eq!(logs[0].level, "info");
        assert_eq!(logs[0].fields["row_id"], 7);
        clear();
    }
}
