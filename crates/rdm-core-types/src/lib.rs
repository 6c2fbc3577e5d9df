//! Core types shared across the report design model crates
//!
//! - **Identifiers**: RequestId, TraceId, TransactionId (UUIDv7 newtypes)
//! - **Schema constants**: Canonical structured-logging field keys and event names

pub mod ids;
pub mod schema;

pub use ids::{RequestContext, RequestId, TraceId, TransactionId};
