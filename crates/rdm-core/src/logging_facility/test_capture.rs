//! In-memory capture of command boundary lines
//!
//! The capture layer is installed once per test binary as the global
//! subscriber; every test reads the shared log and filters it by `op`, so
//! tests should use op names no other test in the binary logs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use super::{EVENT_END, EVENT_END_ERROR, EVENT_START};

/// One logged line with its fields rendered as strings
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field("op")
    }

    pub fn event(&self) -> Option<&str> {
        self.field("event")
    }
}

#[derive(Default)]
struct FieldVisitor(BTreeMap<String, String>);

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Start, end and failure lines logged for one op
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundary {
    pub starts: usize,
    pub ends: usize,
    pub failures: usize,
}

impl Boundary {
    /// Every start was closed by exactly one end or failure line
    pub fn is_balanced(&self) -> bool {
        self.starts == self.ends + self.failures
    }
}

/// Read side of the capture layer
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Lines logged for `op`, in order
    pub fn events_for(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op() == Some(op))
            .collect()
    }

    pub fn boundary(&self, op: &str) -> Boundary {
        self.events_for(op)
            .iter()
            .fold(Boundary::default(), |mut b, e| {
                match e.event() {
                    Some(EVENT_START) => b.starts += 1,
                    Some(EVENT_END) => b.ends += 1,
                    Some(EVENT_END_ERROR) => b.failures += 1,
                    _ => {}
                }
                b
            })
    }

    /// `err.code` of every failure line of `op`
    pub fn failure_codes(&self, op: &str) -> Vec<String> {
        self.events_for(op)
            .iter()
            .filter(|e| e.event() == Some(EVENT_END_ERROR))
            .filter_map(|e| e.field("err.code").map(str::to_string))
            .collect()
    }

    /// # Panics
    ///
    /// Panics if no line of `op` carries `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events_for(op);
        assert!(
            events.iter().any(|e| e.event() == Some(event)),
            "Expected event op={} event={} not found among {} lines for the op",
            op,
            event,
            events.len()
        );
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer on first use and hand out the shared log
///
/// ```
/// use rdm_core::logging_facility::test_capture::init_test_capture;
/// use rdm_core::{log_op_end, log_op_start};
///
/// let capture = init_test_capture();
/// log_op_start!("move_content");
/// log_op_end!("move_content", duration_ms = 1);
/// assert!(capture.boundary("move_content").is_balanced());
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: Arc::clone(&events),
            };
            // Another subscriber may already be installed; capture then stays empty
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { events }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(event: &str) -> CapturedEvent {
        let mut fields = BTreeMap::new();
        fields.insert("op".to_string(), "set_name".to_string());
        fields.insert("event".to_string(), event.to_string());
        CapturedEvent {
            level: Level::INFO,
            fields,
        }
    }

    #[test]
    fn test_boundary_counts_each_event_kind() {
        let capture = TestCapture {
            events: Arc::new(Mutex::new(vec![
                line(EVENT_START),
                line(EVENT_END),
                line(EVENT_START),
                line(EVENT_END_ERROR),
            ])),
        };
        let boundary = capture.boundary("set_name");
        assert_eq!(
            boundary,
            Boundary {
                starts: 2,
                ends: 1,
                failures: 1
            }
        );
        assert!(boundary.is_balanced());
        assert_eq!(capture.boundary("undo"), Boundary::default());
    }
}
