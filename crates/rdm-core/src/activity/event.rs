use serde::Serialize;

use crate::model::{ContentLocation, ElementId, ElementRefValue, PropertyValue};
use crate::schema::NameSpaceKind;

/// Why a notification is being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventCause {
    Command,
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum DesignEvent {
    ContentAdded {
        location: ContentLocation,
        content: ElementId,
    },
    ContentRemoved {
        location: ContentLocation,
        content: ElementId,
    },
    ContentReordered {
        location: ContentLocation,
        content: ElementId,
        from: usize,
        to: usize,
    },
    /// Sent to a content itself when it is attached
    ElementAdded,
    /// Sent to a content itself when it is dropped
    ElementDeleted,
    PropertyChanged {
        property: String,
        old: Option<PropertyValue>,
        new: Option<PropertyValue>,
    },
    NameChanged {
        old: Option<String>,
        new: Option<String>,
    },
    ExtendsChanged {
        old: Option<ElementRefValue>,
        new: Option<ElementRefValue>,
    },
    UserPropertyChanged {
        property: String,
        added: bool,
    },
    NameSpaceChanged {
        space: NameSpaceKind,
        name: String,
        element: ElementId,
        added: bool,
    },
}

impl DesignEvent {
    /// Events of the same change key collapse into one per transaction
    pub(crate) fn collapse_key(&self) -> Option<(&'static str, Option<&str>)> {
        match self {
            DesignEvent::PropertyChanged { property, .. } => Some(("property", Some(property))),
            DesignEvent::NameChanged { .. } => Some(("name", None)),
            DesignEvent::ExtendsChanged { .. } => Some(("extends", None)),
            _ => None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, DesignEvent::ElementDeleted)
    }
}

/// An event addressed to one element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub target: ElementId,
    pub event: DesignEvent,
    pub cause: EventCause,
}

impl Notification {
    pub fn new(target: ElementId, event: DesignEvent) -> Self {
        Self {
            target,
            event,
            cause: EventCause::Command,
        }
    }

    pub fn with_cause(mut self, cause: EventCause) -> Self {
        self.cause = cause;
        self
    }
}
