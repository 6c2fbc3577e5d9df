//! Collapse of a transaction's notifications before delivery

use std::collections::{BTreeSet, HashMap};

use super::event::{DesignEvent, Notification};
use crate::model::ElementId;

/// Collapse a transaction's notifications, preserving FIFO order
///
/// Property, name and extends events for the same target (and property)
/// become one event in the position of the first, carrying the first old
/// value and the last new value. Events aimed at elements that end the
/// transaction deleted are dropped, except the deletion itself.
pub fn collapse(notifications: Vec<Notification>) -> Vec<Notification> {
    let deleted = deleted_at_end(&notifications);

    let mut out: Vec<Notification> = Vec::with_capacity(notifications.len());
    let mut slots: HashMap<(ElementId, &'static str, Option<String>), usize> = HashMap::new();

    for n in notifications {
        if deleted.contains(&n.target) && !n.event.is_deletion() {
            continue;
        }
        let key = n
            .event
            .collapse_key()
            .map(|(what, prop)| (n.target, what, prop.map(str::to_string)));
        if let Some(index) = key.as_ref().and_then(|k| slots.get(k).copied()) {
            merge_into(&mut out[index].event, n.event);
            continue;
        }
        if let Some(k) = key {
            slots.insert(k, out.len());
        }
        out.push(n);
    }
    out
}

fn merge_into(first: &mut DesignEvent, later: DesignEvent) {
    match (first, later) {
        (DesignEvent::PropertyChanged { new, .. }, DesignEvent::PropertyChanged { new: n, .. }) => {
            *new = n
        }
        (DesignEvent::NameChanged { new, .. }, DesignEvent::NameChanged { new: n, .. }) => *new = n,
        (DesignEvent::ExtendsChanged { new, .. }, DesignEvent::ExtendsChanged { new: n, .. }) => {
            *new = n
        }
        _ => {}
    }
}

/// Elements whose last content event in the batch is a deletion
fn deleted_at_end(notifications: &[Notification]) -> BTreeSet<ElementId> {
    let mut deleted = BTreeSet::new();
    for n in notifications {
        match &n.event {
            DesignEvent::ElementDeleted => {
                deleted.insert(n.target);
            }
            DesignEvent::ElementAdded => {
                deleted.remove(&n.target);
            }
            DesignEvent::ContentAdded { content, .. } => {
                deleted.remove(content);
            }
            _ => {}
        }
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentLocation, PropertyValue};
    use crate::schema::slots;

    fn prop(target: u64, old: Option<&str>, new: Option<&str>) -> Notification {
        Notification::new(
            ElementId::new(target),
            DesignEvent::PropertyChanged {
                property: "text".to_string(),
                old: old.map(PropertyValue::string),
                new: new.map(PropertyValue::string),
            },
        )
    }

    #[test]
    fn test_property_events_keep_first_old_and_last_new() {
        let out = collapse(vec![
            prop(2, None, Some("a")),
            prop(3, None, Some("x")),
            prop(2, Some("a"), Some("b")),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], prop(2, None, Some("b")));
        assert_eq!(out[1].target, ElementId::new(3));
    }

    #[test]
    fn test_events_for_deleted_elements_are_dropped() {
        let el = ElementId::new(5);
        let root = ElementId::new(1);
        let out = collapse(vec![
            prop(5, None, Some("a")),
            Notification::new(
                root,
                DesignEvent::ContentRemoved {
                    location: ContentLocation::Slot(slots::BODY),
                    content: el,
                },
            ),
            Notification::new(el, DesignEvent::ElementDeleted),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].target, root);
        assert_eq!(out[1].event, DesignEvent::ElementDeleted);
    }

    #[test]
    fn test_re_added_element_keeps_its_events() {
        let el = ElementId::new(5);
        let root = ElementId::new(1);
        let out = collapse(vec![
            Notification::new(el, DesignEvent::ElementDeleted),
            Notification::new(
                root,
                DesignEvent::ContentAdded {
                    location: ContentLocation::Slot(slots::BODY),
                    content: el,
                },
            ),
            prop(5, None, Some("a")),
        ]);
        assert_eq!(out.len(), 3);
    }
}
