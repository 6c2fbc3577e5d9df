use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::element::ElementId;

/// Pseudo property name under which `extends` edges are indexed
pub const EXTENDS_PROP: &str = "extends";

/// Pseudo property name of the style association
pub const STYLE_PROP: &str = "style";

/// One incoming edge: `referrer.property` points at the indexed target
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BackRef {
    pub referrer: ElementId,
    pub property: String,
}

impl BackRef {
    pub fn new(referrer: ElementId, property: impl Into<String>) -> Self {
        Self {
            referrer,
            property: property.into(),
        }
    }

    pub fn is_extends(&self) -> bool {
        self.property == EXTENDS_PROP
    }
}

/// Reverse index target → clients
///
/// Only back-reference records write to this index, so it follows undo and
/// rollback exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackRefIndex {
    index: BTreeMap<ElementId, BTreeSet<BackRef>>,
}

impl BackRefIndex {
    pub fn clients(&self, target: ElementId) -> impl Iterator<Item = &BackRef> {
        self.index.get(&target).into_iter().flatten()
    }

    pub fn contains(&self, target: ElementId, back_ref: &BackRef) -> bool {
        self.index
            .get(&target)
            .is_some_and(|set| set.contains(back_ref))
    }

    pub(crate) fn add(&mut self, target: ElementId, back_ref: BackRef) -> bool {
        self.index.entry(target).or_default().insert(back_ref)
    }

    pub(crate) fn remove(&mut self, target: ElementId, back_ref: &BackRef) -> bool {
        let Some(set) = self.index.get_mut(&target) else {
            return false;
        };
        let removed = set.remove(back_ref);
        if set.is_empty() {
            self.index.remove(&target);
        }
        removed
    }
}
