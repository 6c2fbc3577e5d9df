use serde::Serialize;

use super::event::{DesignEvent, Notification};
use crate::model::ElementId;
use crate::schema::NameSpaceKind;

/// Receives design notifications after an outermost commit, undo or redo
pub trait DesignListener: Send {
    fn notify(&mut self, notification: &Notification);
}

impl<F> DesignListener for F
where
    F: FnMut(&Notification) + Send,
{
    fn notify(&mut self, notification: &Notification) {
        self(notification)
    }
}

/// What a listener is subscribed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScope {
    Element(ElementId),
    NameSpace(NameSpaceKind),
    All,
}

impl ListenerScope {
    fn matches(&self, notification: &Notification) -> bool {
        match self {
            ListenerScope::All => true,
            ListenerScope::Element(id) => notification.target == *id,
            ListenerScope::NameSpace(kind) => matches!(
                &notification.event,
                DesignEvent::NameSpaceChanged { space, .. } if space == kind
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct ListenerRegistry {
    next: u64,
    entries: Vec<(ListenerId, ListenerScope, Box<dyn DesignListener>)>,
}

impl ListenerRegistry {
    pub fn add(&mut self, scope: ListenerScope, listener: Box<dyn DesignListener>) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.entries.push((id, scope, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver in notification order; listeners of one notification in
    /// registration order
    pub fn dispatch(&mut self, notifications: &[Notification]) {
        for n in notifications {
            for (_, scope, listener) in self.entries.iter_mut() {
                if scope.matches(n) {
                    listener.notify(n);
                }
            }
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.entries.len())
            .finish()
    }
}

/// Undo/redo state changes of the activity stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum StackEvent {
    Done { label: String },
    Undone { label: String },
    Redone { label: String },
    Flushed,
}

pub trait ActivityStackListener: Send {
    fn stack_changed(&mut self, event: &StackEvent);
}

impl<F> ActivityStackListener for F
where
    F: FnMut(&StackEvent) + Send,
{
    fn stack_changed(&mut self, event: &StackEvent) {
        self(event)
    }
}
