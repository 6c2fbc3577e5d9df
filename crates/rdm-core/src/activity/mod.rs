//! Activity records, the transaction stack and change notification

pub mod event;
pub mod filter;
pub mod listener;
pub mod record;
pub mod stack;

pub use event::{DesignEvent, EventCause, Notification};
pub use listener::{
    ActivityStackListener, DesignListener, ListenerId, ListenerRegistry, ListenerScope, StackEvent,
};
pub use record::{Action, Direction, Record, RecordEntry, RecordState};
pub use stack::{ActivityStack, CommitOutcome, Settled, TransOptions, Transaction};
