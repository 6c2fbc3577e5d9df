use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::value::{ElementRefValue, PropertyValue};
use crate::schema::{ElementKind, PropertyKind, SlotId};

/// Arena key of a design element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a content element lives inside its container
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentLocation {
    Slot(SlotId),
    /// A composite property whose value is a content list
    Property(String),
}

impl ContentLocation {
    pub fn property(name: impl Into<String>) -> Self {
        ContentLocation::Property(name.into())
    }

    pub fn slot_id(&self) -> Option<SlotId> {
        match self {
            ContentLocation::Slot(id) => Some(*id),
            ContentLocation::Property(_) => None,
        }
    }
}

impl From<SlotId> for ContentLocation {
    fn from(slot: SlotId) -> Self {
        ContentLocation::Slot(slot)
    }
}

impl fmt::Display for ContentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentLocation::Slot(id) => write!(f, "slot:{}", id.0),
            ContentLocation::Property(name) => write!(f, "property:{}", name),
        }
    }
}

impl FromStr for ContentLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(raw) = s.strip_prefix("slot:") {
            raw.parse::<u16>()
                .map(|n| ContentLocation::Slot(SlotId(n)))
                .map_err(|e| format!("invalid slot id '{}': {}", raw, e))
        } else if let Some(name) = s.strip_prefix("property:") {
            Ok(ContentLocation::Property(name.to_string()))
        } else {
            Err(format!("invalid content location '{}'", s))
        }
    }
}

// String form so locations can key JSON maps
impl Serialize for ContentLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Back pointer from a content element to its container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerContext {
    pub element: ElementId,
    pub location: ContentLocation,
}

impl ContainerContext {
    pub fn new(element: ElementId, location: impl Into<ContentLocation>) -> Self {
        Self {
            element,
            location: location.into(),
        }
    }
}

/// A property definition attached to one element at runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPropertyDefn {
    pub name: String,
    pub kind: PropertyKind,
}

impl UserPropertyDefn {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// One node of the design tree
///
/// Elements never own each other directly. Containment is expressed by id
/// lists keyed by [`ContentLocation`], and every content carries a
/// [`ContainerContext`] pointing back at its container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignElement {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    pub(crate) name: Option<String>,
    pub(crate) extends: Option<ElementRefValue>,
    pub(crate) container: Option<ContainerContext>,
    pub(crate) contents: BTreeMap<ContentLocation, Vec<ElementId>>,
    pub(crate) properties: BTreeMap<String, PropertyValue>,
    pub(crate) user_properties: BTreeMap<String, UserPropertyDefn>,
}

impl DesignElement {
    pub(crate) fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            name: None,
            extends: None,
            container: None,
            contents: BTreeMap::new(),
            properties: BTreeMap::new(),
            user_properties: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn extends(&self) -> Option<&ElementRefValue> {
        self.extends.as_ref()
    }

    pub fn extends_id(&self) -> Option<ElementId> {
        self.extends.as_ref().and_then(ElementRefValue::resolved_id)
    }

    pub fn container(&self) -> Option<&ContainerContext> {
        self.container.as_ref()
    }

    pub fn container_id(&self) -> Option<ElementId> {
        self.container.as_ref().map(|c| c.element)
    }

    /// Contents at `location`, empty when nothing was ever added there
    pub fn content(&self, location: &ContentLocation) -> &[ElementId] {
        self.contents
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn position_of(&self, location: &ContentLocation, content: ElementId) -> Option<usize> {
        self.content(location).iter().position(|id| *id == content)
    }

    /// Every content location with at least one element, in location order
    pub fn content_lists(&self) -> impl Iterator<Item = (&ContentLocation, &[ElementId])> {
        self.contents
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(loc, ids)| (loc, ids.as_slice()))
    }

    pub fn has_contents(&self) -> bool {
        self.contents.values().any(|ids| !ids.is_empty())
    }

    /// Locally set value, ignoring inheritance
    pub fn local_property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn local_properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn user_property(&self, name: &str) -> Option<&UserPropertyDefn> {
        self.user_properties.get(name)
    }

    pub fn user_properties(&self) -> impl Iterator<Item = &UserPropertyDefn> {
        self.user_properties.values()
    }

    /// Name used in messages: the element name or its id
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} '{}'", self.kind, name),
            None => format!("{} {}", self.kind, self.id),
        }
    }
}
