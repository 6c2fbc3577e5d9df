//! Metadata dictionary
//!
//! Read-only description of element kinds: inheritance between kinds,
//! naming rules, slots, properties and the validators each of them triggers.
//! A [`Schema`] is built once (from the built-in report-design dictionary or a
//! JSON document) and shared between modules behind an `Arc`.

pub mod builtin;
pub mod defn;
pub mod kind;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, Result};
use crate::model::ContentLocation;

pub use defn::{
    slots, Cardinality, CompanionRule, ContentDefn, ContextRule, ElementDefn, LocatedContentDefn,
    NameOption, PropertyDefn, PropertyKind, SemanticTrigger, SlotDefn, SlotId, TriggerTarget,
};
pub use kind::{ElementKind, NameSpaceKind};

/// Serialized form of a schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub elements: Vec<ElementDefn>,
    #[serde(default)]
    pub context_rules: Vec<ContextRule>,
}

#[derive(Debug, Clone)]
pub struct Schema {
    defns: BTreeMap<ElementKind, ElementDefn>,
    context_rules: Vec<ContextRule>,
}

impl Schema {
    /// Build and check a schema
    ///
    /// # Errors
    ///
    /// Returns `InvalidSchema` when a kind is defined twice, a parent kind is
    /// missing, the parent chain loops, or a kind declares a slot id or
    /// property name already used up its chain.
    pub fn new(elements: Vec<ElementDefn>, context_rules: Vec<ContextRule>) -> Result<Self> {
        let mut defns = BTreeMap::new();
        for defn in elements {
            let kind = defn.kind;
            if defns.insert(kind, defn).is_some() {
                return Err(DesignError::InvalidSchema {
                    reason: format!("kind {} is defined twice", kind),
                });
            }
        }
        let schema = Self {
            defns,
            context_rules,
        };
        schema.check()?;
        Ok(schema)
    }

    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON and `InvalidSchema` when
    /// the document fails [`Schema::new`] checks.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: SchemaDocument = serde_json::from_str(json)?;
        Self::new(doc.elements, doc.context_rules)
    }

    pub fn to_document(&self) -> SchemaDocument {
        SchemaDocument {
            elements: self.defns.values().cloned().collect(),
            context_rules: self.context_rules.clone(),
        }
    }

    fn check(&self) -> Result<()> {
        let invalid = |reason: String| DesignError::InvalidSchema { reason };
        for defn in self.defns.values() {
            let mut seen = BTreeSet::new();
            let mut current = Some(defn.kind);
            while let Some(kind) = current {
                if !seen.insert(kind) {
                    return Err(invalid(format!("kind {} has a circular parent chain", defn.kind)));
                }
                let Some(d) = self.defns.get(&kind) else {
                    return Err(invalid(format!(
                        "kind {} names undefined parent {}",
                        defn.kind, kind
                    )));
                };
                current = d.parent;
            }
        }

        for defn in self.defns.values() {
            let mut slot_ids = BTreeSet::new();
            let mut prop_names = BTreeSet::new();
            for d in self.chain(defn.kind) {
                for slot in &d.slots {
                    if !slot_ids.insert(slot.id) {
                        return Err(invalid(format!(
                            "slot {} declared twice for {}",
                            slot.id, defn.kind
                        )));
                    }
                    if slot.content_types.is_empty() {
                        return Err(invalid(format!(
                            "slot '{}' of {} accepts nothing",
                            slot.name, d.kind
                        )));
                    }
                }
                for prop in &d.properties {
                    if !prop_names.insert(prop.name.as_str()) {
                        return Err(invalid(format!(
                            "property '{}' declared twice for {}",
                            prop.name, defn.kind
                        )));
                    }
                    if let Some(target) = prop.kind.reference_target() {
                        if !self.defns.contains_key(&target) {
                            return Err(invalid(format!(
                                "property '{}' refers to undefined kind {}",
                                prop.name, target
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Definition of `kind` itself
    pub fn defn(&self, kind: ElementKind) -> Option<&ElementDefn> {
        self.defns.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ElementKind> + '_ {
        self.defns.keys().copied()
    }

    /// `kind` then its ancestors, most specific first
    pub fn chain(&self, kind: ElementKind) -> Vec<&ElementDefn> {
        let mut out: Vec<&ElementDefn> = Vec::new();
        let mut current = self.defns.get(&kind);
        while let Some(defn) = current {
            if out.iter().any(|d| d.kind == defn.kind) {
                break;
            }
            out.push(defn);
            current = defn.parent.and_then(|p| self.defns.get(&p));
        }
        out
    }

    fn inherited<T>(&self, kind: ElementKind, pick: impl Fn(&ElementDefn) -> Option<T>) -> Option<T> {
        self.chain(kind).into_iter().find_map(pick)
    }

    /// `kind` is `base` or inherits from it
    pub fn is_kind_of(&self, kind: ElementKind, base: ElementKind) -> bool {
        self.chain(kind).iter().any(|d| d.kind == base)
    }

    pub fn accepts(&self, content_types: &[ElementKind], kind: ElementKind) -> bool {
        content_types.iter().any(|base| self.is_kind_of(kind, *base))
    }

    pub fn is_abstract(&self, kind: ElementKind) -> bool {
        self.defns.get(&kind).map_or(true, |d| d.is_abstract)
    }

    pub fn name_option(&self, kind: ElementKind) -> NameOption {
        self.inherited(kind, |d| d.name_option)
            .unwrap_or(NameOption::Optional)
    }

    pub fn name_space(&self, kind: ElementKind) -> Option<NameSpaceKind> {
        self.inherited(kind, |d| d.name_space)
    }

    pub fn is_extendable(&self, kind: ElementKind) -> bool {
        self.inherited(kind, |d| d.extendable).unwrap_or(false)
    }

    pub fn is_droppable(&self, kind: ElementKind) -> bool {
        self.inherited(kind, |d| d.droppable).unwrap_or(true)
    }

    pub fn notifies_on_attach(&self, kind: ElementKind) -> bool {
        self.inherited(kind, |d| d.notify_on_attach).unwrap_or(false)
    }

    /// All slots and content-list properties of `kind`, ancestors' first
    pub fn content_defns(&self, kind: ElementKind) -> Vec<LocatedContentDefn<'_>> {
        let mut out = Vec::new();
        for defn in self.chain(kind).into_iter().rev() {
            for slot in &defn.slots {
                out.push((ContentLocation::Slot(slot.id), ContentDefn::of_slot(slot)));
            }
            for prop in &defn.properties {
                if let Some(content) = ContentDefn::of_property(prop) {
                    out.push((ContentLocation::Property(prop.name.clone()), content));
                }
            }
        }
        out
    }

    pub fn content_defn(&self, kind: ElementKind, location: &ContentLocation) -> Option<ContentDefn<'_>> {
        match location {
            ContentLocation::Slot(id) => self
                .chain(kind)
                .into_iter()
                .flat_map(|d| d.slots.iter())
                .find(|s| s.id == *id)
                .map(ContentDefn::of_slot),
            ContentLocation::Property(name) => self
                .property_defn(kind, name)
                .and_then(ContentDefn::of_property),
        }
    }

    pub fn is_container(&self, kind: ElementKind) -> bool {
        !self.content_defns(kind).is_empty()
    }

    /// Resolve a slot or content property by its schema name
    pub fn location_by_name(&self, kind: ElementKind, name: &str) -> Option<ContentLocation> {
        self.content_defns(kind)
            .into_iter()
            .find(|(_, defn)| defn.name == name)
            .map(|(loc, _)| loc)
    }

    pub fn property_defn(&self, kind: ElementKind, name: &str) -> Option<&PropertyDefn> {
        self.chain(kind)
            .into_iter()
            .flat_map(|d| d.properties.iter())
            .find(|p| p.name == name)
    }

    /// Value properties of `kind` (content lists excluded)
    pub fn properties(&self, kind: ElementKind) -> Vec<&PropertyDefn> {
        self.chain(kind)
            .into_iter()
            .rev()
            .flat_map(|d| d.properties.iter())
            .filter(|p| !p.kind.is_content())
            .collect()
    }

    pub fn element_triggers(&self, kind: ElementKind) -> Vec<&SemanticTrigger> {
        self.chain(kind)
            .into_iter()
            .rev()
            .flat_map(|d| d.triggers.iter())
            .collect()
    }

    pub fn companions(&self, kind: ElementKind) -> Vec<&CompanionRule> {
        self.chain(kind)
            .into_iter()
            .rev()
            .flat_map(|d| d.companions.iter())
            .collect()
    }

    pub fn context_rules(&self) -> &[ContextRule] {
        &self.context_rules
    }

    /// Every validator name the schema triggers
    pub fn validator_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        for defn in self.defns.values() {
            let slot_triggers = defn.slots.iter().flat_map(|s| s.triggers.iter());
            let prop_triggers = defn.properties.iter().flat_map(|p| p.triggers.iter());
            for trigger in defn.triggers.iter().chain(slot_triggers).chain(prop_triggers) {
                names.insert(trigger.validator.as_str());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parent_is_rejected() {
        let err = Schema::new(
            vec![ElementDefn::new(ElementKind::Label).parent(ElementKind::ReportItem)],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DesignError::InvalidSchema { .. }));
    }

    #[test]
    fn test_duplicate_slot_up_the_chain_is_rejected() {
        let base = ElementDefn::new(ElementKind::ReportItem)
            .abstract_kind()
            .slot(SlotDefn::multiple(slots::CONTENT, "content", &[ElementKind::Label]));
        let leaf = ElementDefn::new(ElementKind::Cell)
            .parent(ElementKind::ReportItem)
            .slot(SlotDefn::multiple(slots::CONTENT, "again", &[ElementKind::Label]));
        let label = ElementDefn::new(ElementKind::Label);
        let err = Schema::new(vec![base, leaf, label], vec![]).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_flags_inherit_from_nearest_definition() {
        let schema = Schema::new(
            vec![
                ElementDefn::new(ElementKind::DesignElement)
                    .abstract_kind()
                    .names(NameOption::Optional, None),
                ElementDefn::new(ElementKind::DataSet)
                    .parent(ElementKind::DesignElement)
                    .abstract_kind()
                    .names(NameOption::Required, Some(NameSpaceKind::DataSet))
                    .extendable(true),
                ElementDefn::new(ElementKind::OdaDataSet).parent(ElementKind::DataSet),
            ],
            vec![],
        )
        .unwrap();

        assert_eq!(schema.name_option(ElementKind::OdaDataSet), NameOption::Required);
        assert_eq!(
            schema.name_space(ElementKind::OdaDataSet),
            Some(NameSpaceKind::DataSet)
        );
        assert!(schema.is_extendable(ElementKind::OdaDataSet));
        assert!(schema.is_droppable(ElementKind::OdaDataSet));
        assert!(schema.is_kind_of(ElementKind::OdaDataSet, ElementKind::DesignElement));
        assert!(!schema.is_container(ElementKind::OdaDataSet));
    }

    #[test]
    fn test_json_round_trip_of_builtin() {
        let schema = Schema::report_design();
        let json = serde_json::to_string(&schema.to_document()).unwrap();
        let loaded = Schema::from_json_str(&json).unwrap();
        assert_eq!(
            loaded.kinds().collect::<Vec<_>>(),
            schema.kinds().collect::<Vec<_>>()
        );
        assert_eq!(loaded.context_rules(), schema.context_rules());
    }
}
