//! Canonical field keys and event names for structured logging
//!
//! Every log line emitted by the engine uses these keys so that captured
//! output can be asserted on without string drift.

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Design tree identifiers
pub const FIELD_ELEMENT_ID: &str = "element_id";
pub const FIELD_CONTAINER_ID: &str = "container_id";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_PROPERTY: &str = "property";

// Activity stack
pub const FIELD_TRANS_LABEL: &str = "trans_label";
pub const FIELD_TRANS_DEPTH: &str = "trans_depth";
pub const FIELD_RECORD_COUNT: &str = "record_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Operation boundary events
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Activity stack events
pub const EVENT_COMMIT: &str = "commit";
pub const EVENT_ROLLBACK: &str = "rollback";
pub const EVENT_UNDO: &str = "undo";
pub const EVENT_REDO: &str = "redo";
