use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::element::ElementId;
use crate::schema::NameSpaceKind;

/// Case-sensitive name → element map for one name-space kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameSpace {
    names: BTreeMap<String, ElementId>,
}

impl NameSpace {
    pub fn get(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementId)> {
        self.names.iter().map(|(n, id)| (n.as_str(), *id))
    }

    pub(crate) fn insert(&mut self, name: &str, element: ElementId) -> Option<ElementId> {
        self.names.insert(name.to_string(), element)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<ElementId> {
        self.names.remove(name)
    }
}

/// All name spaces of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSpaces {
    spaces: BTreeMap<NameSpaceKind, NameSpace>,
}

impl Default for NameSpaces {
    fn default() -> Self {
        Self {
            spaces: NameSpaceKind::ALL
                .iter()
                .map(|k| (*k, NameSpace::default()))
                .collect(),
        }
    }
}

impl NameSpaces {
    pub fn get(&self, kind: NameSpaceKind) -> &NameSpace {
        static EMPTY: NameSpace = NameSpace {
            names: BTreeMap::new(),
        };
        self.spaces.get(&kind).unwrap_or(&EMPTY)
    }

    pub(crate) fn get_mut(&mut self, kind: NameSpaceKind) -> &mut NameSpace {
        self.spaces.entry(kind).or_default()
    }

    pub fn lookup(&self, kind: NameSpaceKind, name: &str) -> Option<ElementId> {
        self.spaces.get(&kind).and_then(|s| s.get(name))
    }
}
