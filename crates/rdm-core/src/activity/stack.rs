//! Transaction frames and undo/redo history
//!
//! ```text
//! start_trans("A")            frames: [A]
//!   execute(r1)               frames: [A: r1]
//!   start_trans("B")          frames: [A: r1, B]
//!     execute(r2)             frames: [A: r1, B: r2]
//!   commit()                  frames: [A: r1 r2]        (folded, nothing fired)
//! commit()                    done:   [.., A]           (events fired, redo cleared)
//! ```
//!
//! # Invariants
//!
//! 1. Records are applied when executed; a frame only buffers them.
//! 2. Only the outermost commit produces notifications.
//! 3. `done.len() <= undo_limit` after every commit.
//! 4. Undo and redo are refused while any frame is open.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use rdm_core_types::schema::{EVENT_COMMIT, EVENT_REDO, EVENT_ROLLBACK, EVENT_UNDO};
use rdm_core_types::TransactionId;

use super::event::{EventCause, Notification};
use super::filter::collapse;
use super::listener::{ActivityStackListener, StackEvent};
use super::record::{Direction, Record, RecordEntry};
use crate::errors::{DesignError, Result};
use crate::model::DesignState;

/// Options of one transaction frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransOptions {
    /// Deliver notifications at outermost commit
    pub send_events: bool,
    /// Run the validation executor after outermost commit
    pub validate: bool,
}

impl Default for TransOptions {
    fn default() -> Self {
        Self {
            send_events: true,
            validate: true,
        }
    }
}

impl TransOptions {
    /// No notifications, no validation (parser loads)
    pub fn silent() -> Self {
        Self {
            send_events: false,
            validate: false,
        }
    }
}

#[derive(Debug)]
struct Frame {
    label: String,
    options: TransOptions,
    records: Vec<RecordEntry>,
}

/// A committed top-level transaction
#[derive(Debug, Clone)]
pub struct Transaction {
    id: TransactionId,
    label: String,
    committed_at: DateTime<Utc>,
    options: TransOptions,
    records: Vec<RecordEntry>,
}

impl Transaction {
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn committed_at(&self) -> DateTime<Utc> {
        self.committed_at
    }

    pub fn records(&self) -> impl DoubleEndedIterator<Item = &Record> {
        self.records.iter().map(RecordEntry::record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What the caller must do after a commit, undo or redo settled
#[derive(Debug, Clone)]
pub struct Settled {
    pub label: String,
    pub cause: EventCause,
    /// Already collapsed when filtering is on; empty for silent transactions
    pub notifications: Vec<Notification>,
    /// Records in the order they were applied
    pub records: Vec<Record>,
    pub validate: bool,
}

#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// An inner frame was folded into its parent
    Nested,
    /// The outermost frame held no records and was dropped
    Empty,
    Settled(Settled),
}

pub struct ActivityStack {
    frames: Vec<Frame>,
    done: VecDeque<Transaction>,
    undone: Vec<Transaction>,
    undo_limit: usize,
    filter_events: bool,
    save_point: Option<TransactionId>,
    listeners: Vec<Box<dyn ActivityStackListener>>,
}

impl fmt::Debug for ActivityStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityStack")
            .field("depth", &self.frames.len())
            .field("undo_depth", &self.done.len())
            .field("redo_depth", &self.undone.len())
            .field("undo_limit", &self.undo_limit)
            .finish()
    }
}

impl ActivityStack {
    pub fn new(undo_limit: usize, filter_events: bool) -> Self {
        Self {
            frames: Vec::new(),
            done: VecDeque::new(),
            undone: Vec::new(),
            undo_limit,
            filter_events,
            save_point: None,
            listeners: Vec::new(),
        }
    }

    pub fn start_trans(&mut self, label: impl Into<String>) {
        self.start_trans_with(label, TransOptions::default());
    }

    /// Open a frame; nested frames inherit a parent's silence
    pub fn start_trans_with(&mut self, label: impl Into<String>, options: TransOptions) {
        let options = match self.frames.last() {
            Some(parent) => TransOptions {
                send_events: options.send_events && parent.options.send_events,
                validate: options.validate && parent.options.validate,
            },
            None => options,
        };
        self.frames.push(Frame {
            label: label.into(),
            options,
            records: Vec::new(),
        });
    }

    /// Number of open frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn in_transaction(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Apply `record` now and buffer it in the innermost frame
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` when no frame is open, or the record's own
    /// apply error (in which case nothing was buffered).
    pub fn execute(&mut self, state: &mut DesignState, record: Record) -> Result<()> {
        let frame = self.frames.last_mut().ok_or(DesignError::NoTransaction)?;
        let mut entry = RecordEntry::new(record);
        entry.perform(state, false)?;
        frame.records.push(entry);
        Ok(())
    }

    /// Close the innermost frame
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` when no frame is open.
    pub fn commit(&mut self) -> Result<CommitOutcome> {
        let frame = self.frames.pop().ok_or(DesignError::NoTransaction)?;
        if let Some(parent) = self.frames.last_mut() {
            parent.records.extend(frame.records);
            return Ok(CommitOutcome::Nested);
        }
        if frame.records.is_empty() {
            return Ok(CommitOutcome::Empty);
        }

        tracing::debug!(
            event = EVENT_COMMIT,
            trans_label = %frame.label,
            record_count = frame.records.len(),
        );

        let transaction = Transaction {
            id: TransactionId::new(),
            label: frame.label,
            committed_at: Utc::now(),
            options: frame.options,
            records: frame.records,
        };
        let settled = self.settle(&transaction, Direction::Forward, EventCause::Command);

        self.done.push_back(transaction);
        self.undone.clear();
        while self.done.len() > self.undo_limit {
            self.done.pop_front();
        }
        self.fire(StackEvent::Done {
            label: settled.label.clone(),
        });
        Ok(CommitOutcome::Settled(settled))
    }

    /// Reverse and discard the innermost frame; nothing is notified
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` when no frame is open, or `Internal` if a
    /// record cannot be reversed (the state no longer matches it).
    pub fn rollback(&mut self, state: &mut DesignState) -> Result<()> {
        let mut frame = self.frames.pop().ok_or(DesignError::NoTransaction)?;
        tracing::debug!(
            event = EVENT_ROLLBACK,
            trans_label = %frame.label,
            record_count = frame.records.len(),
            trans_depth = self.frames.len(),
        );
        for entry in frame.records.iter_mut().rev() {
            entry.perform(state, true).map_err(|e| DesignError::Internal {
                message: format!("rollback of '{}' failed: {}", frame.label, e),
            })?;
        }
        Ok(())
    }

    /// Roll back every open frame, innermost first
    ///
    /// # Errors
    ///
    /// See [`ActivityStack::rollback`].
    pub fn rollback_all(&mut self, state: &mut DesignState) -> Result<()> {
        while self.in_transaction() {
            self.rollback(state)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `TransactionInProgress` while a frame is open and
    /// `NothingToUndo` when the history is empty.
    pub fn undo(&mut self, state: &mut DesignState) -> Result<Settled> {
        self.ensure_idle()?;
        let mut transaction = self.done.pop_back().ok_or(DesignError::NothingToUndo)?;
        tracing::debug!(event = EVENT_UNDO, trans_label = %transaction.label);

        for i in (0..transaction.records.len()).rev() {
            if let Err(e) = transaction.records[i].perform(state, true) {
                // Re-apply what was already reversed so history stays coherent
                for entry in transaction.records[i + 1..].iter_mut() {
                    entry.perform(state, false).map_err(|again| DesignError::Internal {
                        message: format!(
                            "undo of '{}' failed ({}) and could not be re-applied: {}",
                            transaction.label, e, again
                        ),
                    })?;
                }
                self.done.push_back(transaction);
                return Err(e);
            }
        }

        let settled = self.settle(&transaction, Direction::Reverse, EventCause::Undo);
        self.undone.push(transaction);
        self.fire(StackEvent::Undone {
            label: settled.label.clone(),
        });
        Ok(settled)
    }

    /// # Errors
    ///
    /// Returns `TransactionInProgress` while a frame is open and
    /// `NothingToRedo` when nothing was undone since the last commit.
    pub fn redo(&mut self, state: &mut DesignState) -> Result<Settled> {
        self.ensure_idle()?;
        let mut transaction = self.undone.pop().ok_or(DesignError::NothingToRedo)?;
        tracing::debug!(event = EVENT_REDO, trans_label = %transaction.label);

        for i in 0..transaction.records.len() {
            if let Err(e) = transaction.records[i].perform(state, false) {
                for entry in transaction.records[..i].iter_mut().rev() {
                    entry.perform(state, true).map_err(|again| DesignError::Internal {
                        message: format!(
                            "redo of '{}' failed ({}) and could not be reversed: {}",
                            transaction.label, e, again
                        ),
                    })?;
                }
                self.undone.push(transaction);
                return Err(e);
            }
        }

        let settled = self.settle(&transaction, Direction::Forward, EventCause::Redo);
        self.done.push_back(transaction);
        self.fire(StackEvent::Redone {
            label: settled.label.clone(),
        });
        Ok(settled)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.frames.is_empty() {
            Ok(())
        } else {
            Err(DesignError::TransactionInProgress {
                depth: self.frames.len(),
            })
        }
    }

    fn settle(&self, transaction: &Transaction, direction: Direction, cause: EventCause) -> Settled {
        let ordered: Vec<&Record> = match direction {
            Direction::Forward => transaction.records().collect(),
            Direction::Reverse => transaction.records().rev().collect(),
        };
        let notifications = if transaction.options.send_events {
            let raw: Vec<Notification> = ordered
                .iter()
                .flat_map(|r| r.events(direction))
                .map(|n| n.with_cause(cause))
                .collect();
            if self.filter_events {
                collapse(raw)
            } else {
                raw
            }
        } else {
            Vec::new()
        };
        Settled {
            label: transaction.label.clone(),
            cause,
            notifications,
            records: ordered.into_iter().cloned().collect(),
            validate: transaction.options.validate,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.done.back().map(|t| t.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.undone.last().map(|t| t.label.as_str())
    }

    pub fn undo_depth(&self) -> usize {
        self.done.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.undone.len()
    }

    /// Most recent committed transaction
    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.done.back()
    }

    pub fn undo_limit(&self) -> usize {
        self.undo_limit
    }

    /// Change the limit, evicting the oldest transactions if needed
    pub fn set_undo_limit(&mut self, limit: usize) {
        self.undo_limit = limit;
        while self.done.len() > self.undo_limit {
            self.done.pop_front();
        }
    }

    /// Remember the current history position as saved
    pub fn mark_saved(&mut self) {
        self.save_point = self.done.back().map(|t| t.id.clone());
    }

    /// The history moved away from the save point
    pub fn is_dirty(&self) -> bool {
        self.done.back().map(|t| &t.id) != self.save_point.as_ref()
    }

    /// Forget all history, e.g. after a load
    pub fn flush(&mut self) {
        self.done.clear();
        self.undone.clear();
        self.save_point = None;
        self.fire(StackEvent::Flushed);
    }

    pub fn add_listener(&mut self, listener: Box<dyn ActivityStackListener>) {
        self.listeners.push(listener);
    }

    fn fire(&mut self, event: StackEvent) {
        for listener in self.listeners.iter_mut() {
            listener.stack_changed(&event);
        }
    }
}
