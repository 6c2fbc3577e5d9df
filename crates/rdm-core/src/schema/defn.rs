use serde::{Deserialize, Serialize};

use super::kind::{ElementKind, NameSpaceKind};
use crate::model::{ContentLocation, PropertyValue};

/// Identity of a slot on its container kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u16);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot ids used by the built-in dictionary
pub mod slots {
    use super::SlotId;

    pub const STYLES: SlotId = SlotId(0);
    pub const THEMES: SlotId = SlotId(1);
    /// Library-style components other elements may extend
    pub const COMPONENTS: SlotId = SlotId(2);
    pub const DATA_SOURCES: SlotId = SlotId(3);
    pub const DATA_SETS: SlotId = SlotId(4);
    pub const PARAMETERS: SlotId = SlotId(5);
    pub const PAGES: SlotId = SlotId(6);
    pub const BODY: SlotId = SlotId(7);
    pub const CUBES: SlotId = SlotId(8);

    pub const HEADER: SlotId = SlotId(10);
    pub const DETAIL: SlotId = SlotId(11);
    pub const FOOTER: SlotId = SlotId(12);
    pub const GROUPS: SlotId = SlotId(13);
    pub const COLUMNS: SlotId = SlotId(14);
    pub const ROWS: SlotId = SlotId(15);
    pub const CELLS: SlotId = SlotId(16);
    pub const CONTENT: SlotId = SlotId(17);
    pub const PAGE_HEADER: SlotId = SlotId(18);
    pub const PAGE_FOOTER: SlotId = SlotId(19);
    pub const GROUP_HEADER: SlotId = SlotId(20);
    pub const GROUP_FOOTER: SlotId = SlotId(21);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    Single,
    Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameOption {
    Required,
    Optional,
    Forbidden,
}

/// Which element a trigger validates, relative to the changed element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerTarget {
    #[default]
    Focus,
    Container,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticTrigger {
    pub validator: String,
    #[serde(default)]
    pub target: TriggerTarget,
}

impl SemanticTrigger {
    pub fn focus(validator: &str) -> Self {
        Self {
            validator: validator.to_string(),
            target: TriggerTarget::Focus,
        }
    }

    pub fn container(validator: &str) -> Self {
        Self {
            validator: validator.to_string(),
            target: TriggerTarget::Container,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PropertyKind {
    String,
    Integer,
    Boolean,
    Expression,
    Choice {
        choices: Vec<String>,
    },
    StringList,
    ElementRef {
        target: ElementKind,
    },
    /// A composite property whose value is a list of content elements
    ContentList {
        cardinality: Cardinality,
        content_types: Vec<ElementKind>,
    },
}

impl PropertyKind {
    pub fn is_reference(&self) -> bool {
        matches!(self, PropertyKind::ElementRef { .. })
    }

    pub fn is_content(&self) -> bool {
        matches!(self, PropertyKind::ContentList { .. })
    }

    pub fn reference_target(&self) -> Option<ElementKind> {
        match self {
            PropertyKind::ElementRef { target } => Some(*target),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefn {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(default = "default_true")]
    pub inheritable: bool,
    /// Falls back to the element's style when not set locally or by extends
    #[serde(default)]
    pub style_property: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<PropertyValue>,
    #[serde(default)]
    pub triggers: Vec<SemanticTrigger>,
}

impl PropertyDefn {
    pub fn new(name: &str, kind: PropertyKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            inheritable: true,
            style_property: false,
            required: false,
            default: None,
            triggers: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn not_inheritable(mut self) -> Self {
        self.inheritable = false;
        self
    }

    pub fn style(mut self) -> Self {
        self.style_property = true;
        self
    }

    pub fn with_default(mut self, value: PropertyValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn trigger(mut self, trigger: SemanticTrigger) -> Self {
        self.triggers.push(trigger);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefn {
    pub id: SlotId,
    pub name: String,
    pub cardinality: Cardinality,
    pub content_types: Vec<ElementKind>,
    #[serde(default)]
    pub triggers: Vec<SemanticTrigger>,
}

impl SlotDefn {
    pub fn multiple(id: SlotId, name: &str, content_types: &[ElementKind]) -> Self {
        Self {
            id,
            name: name.to_string(),
            cardinality: Cardinality::Multiple,
            content_types: content_types.to_vec(),
            triggers: Vec::new(),
        }
    }

    pub fn single(id: SlotId, name: &str, content_types: &[ElementKind]) -> Self {
        Self {
            cardinality: Cardinality::Single,
            ..Self::multiple(id, name, content_types)
        }
    }

    pub fn trigger(mut self, trigger: SemanticTrigger) -> Self {
        self.triggers.push(trigger);
        self
    }
}

/// `required` must be non-blank whenever any of `when_any_set` is non-blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionRule {
    pub required: String,
    pub when_any_set: Vec<String>,
}

/// Schema-level containment restrictions beyond slot type sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum ContextRule {
    /// `content` (or anything of that family) may not appear anywhere below `ancestor`
    ForbiddenUnder {
        content: ElementKind,
        ancestor: ElementKind,
    },
}

/// Definition of one element kind
///
/// Optional flags are inherited from the nearest definition in the parent
/// chain that sets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefn {
    pub kind: ElementKind,
    #[serde(default)]
    pub parent: Option<ElementKind>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub name_option: Option<NameOption>,
    #[serde(default)]
    pub name_space: Option<NameSpaceKind>,
    #[serde(default)]
    pub extendable: Option<bool>,
    #[serde(default)]
    pub droppable: Option<bool>,
    /// Send an element-added notification to the content itself on attach
    #[serde(default)]
    pub notify_on_attach: Option<bool>,
    #[serde(default)]
    pub slots: Vec<SlotDefn>,
    #[serde(default)]
    pub properties: Vec<PropertyDefn>,
    #[serde(default)]
    pub triggers: Vec<SemanticTrigger>,
    #[serde(default)]
    pub companions: Vec<CompanionRule>,
}

impl ElementDefn {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parent: None,
            is_abstract: false,
            name_option: None,
            name_space: None,
            extendable: None,
            droppable: None,
            notify_on_attach: None,
            slots: Vec::new(),
            properties: Vec::new(),
            triggers: Vec::new(),
            companions: Vec::new(),
        }
    }

    pub fn parent(mut self, parent: ElementKind) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn abstract_kind(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn names(mut self, option: NameOption, space: Option<NameSpaceKind>) -> Self {
        self.name_option = Some(option);
        self.name_space = space;
        self
    }

    pub fn extendable(mut self, extendable: bool) -> Self {
        self.extendable = Some(extendable);
        self
    }

    pub fn droppable(mut self, droppable: bool) -> Self {
        self.droppable = Some(droppable);
        self
    }

    pub fn notify_on_attach(mut self) -> Self {
        self.notify_on_attach = Some(true);
        self
    }

    pub fn slot(mut self, slot: SlotDefn) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn property(mut self, property: PropertyDefn) -> Self {
        self.properties.push(property);
        self
    }

    pub fn trigger(mut self, trigger: SemanticTrigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn companion(mut self, required: &str, when_any_set: &[&str]) -> Self {
        self.companions.push(CompanionRule {
            required: required.to_string(),
            when_any_set: when_any_set.iter().map(|s| s.to_string()).collect(),
        });
        self
    }
}

/// Uniform view over a slot or a content-list property
#[derive(Debug, Clone, Copy)]
pub struct ContentDefn<'a> {
    pub name: &'a str,
    pub cardinality: Cardinality,
    pub content_types: &'a [ElementKind],
    pub triggers: &'a [SemanticTrigger],
}

impl<'a> ContentDefn<'a> {
    pub(crate) fn of_slot(slot: &'a SlotDefn) -> Self {
        Self {
            name: &slot.name,
            cardinality: slot.cardinality,
            content_types: &slot.content_types,
            triggers: &slot.triggers,
        }
    }

    pub(crate) fn of_property(property: &'a PropertyDefn) -> Option<Self> {
        match &property.kind {
            PropertyKind::ContentList {
                cardinality,
                content_types,
            } => Some(Self {
                name: &property.name,
                cardinality: *cardinality,
                content_types,
                triggers: &property.triggers,
            }),
            _ => None,
        }
    }

    pub fn is_single(&self) -> bool {
        self.cardinality == Cardinality::Single
    }
}

/// Location of a content list paired with its definition
pub type LocatedContentDefn<'a> = (ContentLocation, ContentDefn<'a>);
