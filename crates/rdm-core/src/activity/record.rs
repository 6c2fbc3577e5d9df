//! Reversible changes to the design state
//!
//! A [`Record`] is an immutable value: it carries both the old and the new
//! side of its change and knows how to apply itself in either direction.
//! [`RecordEntry`] wraps a record with its execution state so the stack can
//! refuse illegal transitions.

use serde::Serialize;

use super::event::{DesignEvent, Notification};
use crate::errors::{DesignError, Result};
use crate::model::{
    BackRef, ContentLocation, DesignState, ElementId, ElementRefValue, PropertyValue,
    UserPropertyDefn,
};
use crate::schema::NameSpaceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Whether the forward action adds or removes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Add,
    Remove,
}

impl Action {
    fn adds(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Action::Add, Direction::Forward) | (Action::Remove, Direction::Reverse)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "kebab-case")]
pub enum Record {
    /// Insert or remove `content` at `position` of a content list
    Content {
        container: ElementId,
        location: ContentLocation,
        content: ElementId,
        position: usize,
        action: Action,
        /// Also notify the content itself (element added / deleted)
        notify_content: bool,
    },
    /// Reorder within one content list
    MoveContent {
        container: ElementId,
        location: ContentLocation,
        content: ElementId,
        from: usize,
        to: usize,
    },
    Property {
        element: ElementId,
        property: String,
        old: Option<PropertyValue>,
        new: Option<PropertyValue>,
    },
    Name {
        element: ElementId,
        old: Option<String>,
        new: Option<String>,
    },
    Extends {
        element: ElementId,
        old: Option<ElementRefValue>,
        new: Option<ElementRefValue>,
    },
    NameSpace {
        space: NameSpaceKind,
        name: String,
        element: ElementId,
        action: Action,
        /// Module root, target of the notification
        module: ElementId,
    },
    /// Reverse-index maintenance, never notified
    BackRef {
        target: ElementId,
        back_ref: BackRef,
        action: Action,
    },
    UserProperty {
        element: ElementId,
        defn: UserPropertyDefn,
        action: Action,
    },
}

impl Record {
    /// Apply the change in `direction`
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the state does not match what the record
    /// expects (for example, content not at the recorded position).
    pub fn apply(&self, state: &mut DesignState, direction: Direction) -> Result<()> {
        let forward = direction == Direction::Forward;
        match self {
            Record::Content {
                container,
                location,
                content,
                position,
                action,
                ..
            } => {
                if action.adds(direction) {
                    state.attach(*container, location, *content, *position)
                } else {
                    state.detach(*container, location, *content, *position)
                }
            }
            Record::MoveContent {
                container,
                location,
                from,
                to,
                ..
            } => {
                let (from, to) = if forward { (*from, *to) } else { (*to, *from) };
                state.reorder(*container, location, from, to)
            }
            Record::Property {
                element,
                property,
                old,
                new,
            } => {
                let value = if forward { new } else { old };
                state.put_property(*element, property, value.clone())
            }
            Record::Name { element, old, new } => {
                let value = if forward { new } else { old };
                state.put_name(*element, value.clone())
            }
            Record::Extends { element, old, new } => {
                let value = if forward { new } else { old };
                state.put_extends(*element, value.clone())
            }
            Record::NameSpace {
                space,
                name,
                element,
                action,
                ..
            } => {
                if action.adds(direction) {
                    state.name_space_insert(*space, name, *element)
                } else {
                    state.name_space_remove(*space, name, *element)
                }
            }
            Record::BackRef {
                target,
                back_ref,
                action,
            } => {
                if action.adds(direction) {
                    state.back_ref_add(*target, back_ref.clone());
                } else {
                    state.back_ref_remove(*target, back_ref);
                }
                Ok(())
            }
            Record::UserProperty {
                element,
                defn,
                action,
            } => state.put_user_property(*element, defn, action.adds(direction)),
        }
    }

    /// Element the change is about
    pub fn target(&self) -> ElementId {
        match self {
            Record::Content { container, .. } | Record::MoveContent { container, .. } => *container,
            Record::Property { element, .. }
            | Record::Name { element, .. }
            | Record::Extends { element, .. }
            | Record::UserProperty { element, .. } => *element,
            Record::NameSpace { module, .. } => *module,
            Record::BackRef { target, .. } => *target,
        }
    }

    /// Notifications produced by applying the record in `direction`
    pub fn events(&self, direction: Direction) -> Vec<Notification> {
        let forward = direction == Direction::Forward;
        match self {
            Record::Content {
                container,
                location,
                content,
                action,
                notify_content,
                ..
            } => {
                let adds = action.adds(direction);
                let event = if adds {
                    DesignEvent::ContentAdded {
                        location: location.clone(),
                        content: *content,
                    }
                } else {
                    DesignEvent::ContentRemoved {
                        location: location.clone(),
                        content: *content,
                    }
                };
                let mut out = vec![Notification::new(*container, event)];
                if *notify_content {
                    let own = if adds {
                        DesignEvent::ElementAdded
                    } else {
                        DesignEvent::ElementDeleted
                    };
                    out.push(Notification::new(*content, own));
                }
                out
            }
            Record::MoveContent {
                container,
                location,
                content,
                from,
                to,
            } => {
                let (from, to) = if forward { (*from, *to) } else { (*to, *from) };
                vec![Notification::new(
                    *container,
                    DesignEvent::ContentReordered {
                        location: location.clone(),
                        content: *content,
                        from,
                        to,
                    },
                )]
            }
            Record::Property {
                element,
                property,
                old,
                new,
            } => {
                let (old, new) = if forward { (old, new) } else { (new, old) };
                vec![Notification::new(
                    *element,
                    DesignEvent::PropertyChanged {
                        property: property.clone(),
                        old: old.clone(),
                        new: new.clone(),
                    },
                )]
            }
            Record::Name { element, old, new } => {
                let (old, new) = if forward { (old, new) } else { (new, old) };
                vec![Notification::new(
                    *element,
                    DesignEvent::NameChanged {
                        old: old.clone(),
                        new: new.clone(),
                    },
                )]
            }
            Record::Extends { element, old, new } => {
                let (old, new) = if forward { (old, new) } else { (new, old) };
                vec![Notification::new(
                    *element,
                    DesignEvent::ExtendsChanged {
                        old: old.clone(),
                        new: new.clone(),
                    },
                )]
            }
            Record::NameSpace {
                space,
                name,
                element,
                action,
                module,
            } => vec![Notification::new(
                *module,
                DesignEvent::NameSpaceChanged {
                    space: *space,
                    name: name.clone(),
                    element: *element,
                    added: action.adds(direction),
                },
            )],
            Record::BackRef { .. } => Vec::new(),
            Record::UserProperty {
                element,
                defn,
                action,
            } => vec![Notification::new(
                *element,
                DesignEvent::UserPropertyChanged {
                    property: defn.name.clone(),
                    added: action.adds(direction),
                },
            )],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Initial,
    Done,
    Undone,
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordState::Initial => "initial",
            RecordState::Done => "done",
            RecordState::Undone => "undone",
        };
        f.write_str(s)
    }
}

/// A record together with its execution state
#[derive(Debug, Clone)]
pub struct RecordEntry {
    record: Record,
    state: RecordState,
}

impl RecordEntry {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            state: RecordState::Initial,
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    /// Execute (`undo == false`) or reverse (`undo == true`) the record
    ///
    /// Legal transitions are `Initial -> Done`, `Done -> Undone` and
    /// `Undone -> Done`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecordTransition` for any other transition, or the
    /// error of [`Record::apply`].
    pub fn perform(&mut self, design: &mut DesignState, undo: bool) -> Result<()> {
        let (direction, next) = match (self.state, undo) {
            (RecordState::Initial | RecordState::Undone, false) => {
                (Direction::Forward, RecordState::Done)
            }
            (RecordState::Done, true) => (Direction::Reverse, RecordState::Undone),
            (state, undo) => {
                return Err(DesignError::InvalidRecordTransition {
                    state: state.to_string(),
                    action: if undo { "undone" } else { "done" }.to_string(),
                })
            }
        };
        self.record.apply(design, direction)?;
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{slots, ElementKind};

    fn name_record(element: ElementId) -> Record {
        Record::Name {
            element,
            old: None,
            new: Some("foo".to_string()),
        }
    }

    #[test]
    fn test_entry_state_machine() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let label = state.allocate(ElementKind::Label);
        let mut entry = RecordEntry::new(name_record(label));

        let err = entry.perform(&mut state, true).unwrap_err();
        assert!(matches!(err, DesignError::InvalidRecordTransition { .. }));

        entry.perform(&mut state, false).unwrap();
        assert_eq!(entry.state(), RecordState::Done);
        assert_eq!(state.get(label).unwrap().name(), Some("foo"));
        assert!(entry.perform(&mut state, false).is_err());

        entry.perform(&mut state, true).unwrap();
        assert_eq!(entry.state(), RecordState::Undone);
        assert_eq!(state.get(label).unwrap().name(), None);

        entry.perform(&mut state, false).unwrap();
        assert_eq!(entry.state(), RecordState::Done);
    }

    #[test]
    fn test_reverse_events_swap_values() {
        let el = ElementId::new(4);
        let events = name_record(el).events(Direction::Reverse);
        assert_eq!(
            events[0].event,
            DesignEvent::NameChanged {
                old: Some("foo".to_string()),
                new: None
            }
        );
    }

    #[test]
    fn test_content_record_notifies_content_when_asked() {
        let record = Record::Content {
            container: ElementId::new(1),
            location: ContentLocation::Slot(slots::STYLES),
            content: ElementId::new(2),
            position: 0,
            action: Action::Add,
            notify_content: true,
        };
        let forward = record.events(Direction::Forward);
        assert_eq!(forward.len(), 2);
        assert_eq!(forward[1].event, DesignEvent::ElementAdded);

        let reverse = record.events(Direction::Reverse);
        assert!(matches!(reverse[0].event, DesignEvent::ContentRemoved { .. }));
        assert_eq!(reverse[1].event, DesignEvent::ElementDeleted);
    }

    #[test]
    fn test_back_ref_records_are_silent() {
        let record = Record::BackRef {
            target: ElementId::new(2),
            back_ref: BackRef::new(ElementId::new(3), "style"),
            action: Action::Add,
        };
        assert!(record.events(Direction::Forward).is_empty());
    }
}
