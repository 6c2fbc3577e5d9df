use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use super::back_ref::{BackRef, BackRefIndex, EXTENDS_PROP};
use super::element::{ContainerContext, ContentLocation, DesignElement, ElementId, UserPropertyDefn};
use super::name_space::NameSpaces;
use super::value::{ElementRefValue, PropertyValue};
use crate::errors::{DesignError, Result};
use crate::schema::{ElementKind, NameSpaceKind};

/// Everything the activity records mutate
///
/// The arena keeps detached elements so that undoing a removal can re-attach
/// the very same element. Serialization covers the observable state only and
/// feeds [`crate::digest::state_digest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignState {
    root: ElementId,
    elements: BTreeMap<ElementId, DesignElement>,
    name_spaces: NameSpaces,
    back_refs: BackRefIndex,
    #[serde(skip)]
    id_map: Option<BTreeSet<ElementId>>,
    #[serde(skip)]
    next_id: u64,
}

impl DesignState {
    pub(crate) fn new(root_kind: ElementKind, track_ids: bool) -> Self {
        let root = ElementId::new(1);
        let mut elements = BTreeMap::new();
        elements.insert(root, DesignElement::new(root, root_kind));
        Self {
            root,
            elements,
            name_spaces: NameSpaces::default(),
            back_refs: BackRefIndex::default(),
            id_map: track_ids.then(|| BTreeSet::from([root])),
            next_id: 2,
        }
    }

    /// Create a detached element in the arena
    pub(crate) fn allocate(&mut self, kind: ElementKind) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, DesignElement::new(id, kind));
        id
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn get(&self, id: ElementId) -> Option<&DesignElement> {
        self.elements.get(&id)
    }

    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not in the arena.
    pub fn element(&self, id: ElementId) -> Result<&DesignElement> {
        self.elements
            .get(&id)
            .ok_or(DesignError::ElementNotFound { element: id })
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Result<&mut DesignElement> {
        self.elements
            .get_mut(&id)
            .ok_or(DesignError::ElementNotFound { element: id })
    }

    pub fn elements(&self) -> impl Iterator<Item = &DesignElement> {
        self.elements.values()
    }

    pub fn name_spaces(&self) -> &NameSpaces {
        &self.name_spaces
    }

    pub fn back_refs(&self) -> &BackRefIndex {
        &self.back_refs
    }

    pub fn tracks_ids(&self) -> bool {
        self.id_map.is_some()
    }

    /// Attached (transitively) under the module root
    pub fn is_live(&self, id: ElementId) -> bool {
        match &self.id_map {
            Some(map) => map.contains(&id),
            None => self.reaches_root(id),
        }
    }

    fn reaches_root(&self, id: ElementId) -> bool {
        let mut current = id;
        for _ in 0..=self.elements.len() {
            if current == self.root {
                return true;
            }
            match self.get(current).and_then(DesignElement::container_id) {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }

    /// Live elements in tree order, root first
    pub fn live_elements(&self) -> Vec<ElementId> {
        self.subtree(self.root)
    }

    /// Containers of `id`, nearest first
    pub fn containers_of(&self, id: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(DesignElement::container_id);
        while let Some(next) = current {
            if chain.contains(&next) || chain.len() > self.elements.len() {
                break;
            }
            chain.push(next);
            current = self.get(next).and_then(DesignElement::container_id);
        }
        chain
    }

    /// `id` equals `ancestor` or sits somewhere below it
    pub fn is_within(&self, id: ElementId, ancestor: ElementId) -> bool {
        id == ancestor || self.containers_of(id).contains(&ancestor)
    }

    /// `id` and all its contents, pre-order
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(el) = self.get(next) else { continue };
            out.push(next);
            let children: Vec<ElementId> = el
                .content_lists()
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Index entries that still match the referrer's current value
    pub fn clients(&self, target: ElementId) -> Vec<BackRef> {
        self.back_refs
            .clients(target)
            .filter(|r| self.refers_to(r, target))
            .cloned()
            .collect()
    }

    fn refers_to(&self, back_ref: &BackRef, target: ElementId) -> bool {
        let Some(referrer) = self.get(back_ref.referrer) else {
            return false;
        };
        if back_ref.is_extends() {
            return referrer.extends_id() == Some(target);
        }
        referrer
            .local_property(&back_ref.property)
            .and_then(PropertyValue::as_element_ref)
            .and_then(ElementRefValue::resolved_id)
            == Some(target)
    }

    /// Elements whose `extends` points directly at `id`
    pub fn derived_elements(&self, id: ElementId) -> Vec<ElementId> {
        self.clients(id)
            .into_iter()
            .filter(BackRef::is_extends)
            .map(|r| r.referrer)
            .collect()
    }

    /// Every element that inherits from `id`, directly or not
    pub fn all_derived(&self, id: ElementId) -> Vec<ElementId> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([id]);
        let mut out = Vec::new();
        while let Some(next) = queue.pop_front() {
            for child in self.derived_elements(next) {
                if child != id && seen.insert(child) {
                    out.push(child);
                    queue.push_back(child);
                }
            }
        }
        out
    }

    /// Resolved `extends` chain of `id`, nearest parent first
    pub fn extends_chain(&self, id: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(DesignElement::extends_id);
        while let Some(parent) = current {
            if parent == id || chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.get(parent).and_then(DesignElement::extends_id);
        }
        chain
    }

    // ----- primitive mutations, called only from activity records -----

    pub(crate) fn attach(
        &mut self,
        container: ElementId,
        location: &ContentLocation,
        content: ElementId,
        position: usize,
    ) -> Result<()> {
        let list = self
            .element_mut(container)?
            .contents
            .entry(location.clone())
            .or_default();
        if position > list.len() {
            return Err(DesignError::Internal {
                message: format!(
                    "attach position {} out of range for {} at {}",
                    position, container, location
                ),
            });
        }
        list.insert(position, content);
        self.element_mut(content)?.container = Some(ContainerContext::new(container, location.clone()));

        if self.id_map.is_some() && self.is_live(container) {
            let added = self.subtree(content);
            if let Some(map) = self.id_map.as_mut() {
                map.extend(added);
            }
        }
        Ok(())
    }

    pub(crate) fn detach(
        &mut self,
        container: ElementId,
        location: &ContentLocation,
        content: ElementId,
        position: usize,
    ) -> Result<()> {
        let list = self
            .element_mut(container)?
            .contents
            .get_mut(location)
            .ok_or_else(|| DesignError::Internal {
                message: format!("no content list at {} on {}", location, container),
            })?;
        if list.get(position) != Some(&content) {
            return Err(DesignError::Internal {
                message: format!("{} is not at position {} of {}", content, position, location),
            });
        }
        list.remove(position);
        if list.is_empty() {
            self.element_mut(container)?.contents.remove(location);
        }
        self.element_mut(content)?.container = None;

        if self.id_map.as_ref().is_some_and(|m| m.contains(&content)) {
            let removed = self.subtree(content);
            if let Some(map) = self.id_map.as_mut() {
                for id in removed {
                    map.remove(&id);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn reorder(
        &mut self,
        container: ElementId,
        location: &ContentLocation,
        from: usize,
        to: usize,
    ) -> Result<()> {
        let list = self
            .element_mut(container)?
            .contents
            .get_mut(location)
            .ok_or_else(|| DesignError::Internal {
                message: format!("no content list at {} on {}", location, container),
            })?;
        if from >= list.len() || to >= list.len() {
            return Err(DesignError::Internal {
                message: format!("reorder {} -> {} out of range at {}", from, to, location),
            });
        }
        let moved = list.remove(from);
        list.insert(to, moved);
        Ok(())
    }

    pub(crate) fn put_property(
        &mut self,
        element: ElementId,
        name: &str,
        value: Option<PropertyValue>,
    ) -> Result<()> {
        let el = self.element_mut(element)?;
        match value {
            Some(v) => el.properties.insert(name.to_string(), v),
            None => el.properties.remove(name),
        };
        Ok(())
    }

    pub(crate) fn put_name(&mut self, element: ElementId, name: Option<String>) -> Result<()> {
        self.element_mut(element)?.name = name;
        Ok(())
    }

    pub(crate) fn put_extends(
        &mut self,
        element: ElementId,
        extends: Option<ElementRefValue>,
    ) -> Result<()> {
        self.element_mut(element)?.extends = extends;
        Ok(())
    }

    pub(crate) fn put_user_property(
        &mut self,
        element: ElementId,
        defn: &UserPropertyDefn,
        present: bool,
    ) -> Result<()> {
        let el = self.element_mut(element)?;
        if present {
            el.user_properties.insert(defn.name.clone(), defn.clone());
        } else {
            el.user_properties.remove(&defn.name);
        }
        Ok(())
    }

    pub(crate) fn name_space_insert(
        &mut self,
        space: NameSpaceKind,
        name: &str,
        element: ElementId,
    ) -> Result<()> {
        let ns = self.name_spaces.get_mut(space);
        match ns.get(name) {
            Some(existing) if existing != element => Err(DesignError::Internal {
                message: format!("name '{}' already bound to {} in {}", name, existing, space),
            }),
            _ => {
                ns.insert(name, element);
                Ok(())
            }
        }
    }

    pub(crate) fn name_space_remove(
        &mut self,
        space: NameSpaceKind,
        name: &str,
        element: ElementId,
    ) -> Result<()> {
        let ns = self.name_spaces.get_mut(space);
        match ns.get(name) {
            Some(existing) if existing == element => {
                ns.remove(name);
                Ok(())
            }
            _ => Err(DesignError::Internal {
                message: format!("name '{}' is not bound to {} in {}", name, element, space),
            }),
        }
    }

    pub(crate) fn back_ref_add(&mut self, target: ElementId, back_ref: BackRef) {
        self.back_refs.add(target, back_ref);
    }

    pub(crate) fn back_ref_remove(&mut self, target: ElementId, back_ref: &BackRef) {
        self.back_refs.remove(target, back_ref);
    }

    /// Non-undoable update of a cached reference
    ///
    /// The back reference of a previously resolved target is dropped; a new
    /// one is kept only while the referrer is live.
    pub(crate) fn cache_reference(
        &mut self,
        referrer: ElementId,
        property: &str,
        value: ElementRefValue,
    ) -> Result<()> {
        let el = self.element(referrer)?;
        let previous = if property == EXTENDS_PROP {
            el.extends_id()
        } else {
            el.local_property(property)
                .and_then(PropertyValue::as_element_ref)
                .and_then(ElementRefValue::resolved_id)
        };
        let back_ref = BackRef::new(referrer, property);
        if let Some(old) = previous {
            self.back_ref_remove(old, &back_ref);
        }

        let target = value.resolved_id();
        if property == EXTENDS_PROP {
            self.put_extends(referrer, Some(value))?;
        } else {
            self.put_property(referrer, property, Some(PropertyValue::ElementRef(value)))?;
        }
        if let Some(target) = target {
            if self.is_live(referrer) {
                self.back_ref_add(target, back_ref);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::STYLE_PROP;
    use crate::schema::slots;

    fn body() -> ContentLocation {
        ContentLocation::Slot(slots::BODY)
    }

    #[test]
    fn test_attach_detach_tracks_liveness() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let root = state.root();
        let table = state.allocate(ElementKind::Table);
        let row = state.allocate(ElementKind::Row);
        state
            .attach(table, &ContentLocation::Slot(slots::DETAIL), row, 0)
            .unwrap();
        assert!(!state.is_live(row));

        state.attach(root, &body(), table, 0).unwrap();
        assert!(state.is_live(table));
        assert!(state.is_live(row));
        assert_eq!(state.containers_of(row), vec![table, root]);

        state.detach(root, &body(), table, 0).unwrap();
        assert!(!state.is_live(row));
        assert!(state.get(root).unwrap().content(&body()).is_empty());
    }

    #[test]
    fn test_untracked_liveness_walks_containers() {
        let mut state = DesignState::new(ElementKind::ReportDesign, false);
        let root = state.root();
        let label = state.allocate(ElementKind::Label);
        assert!(!state.is_live(label));
        state.attach(root, &body(), label, 0).unwrap();
        assert!(state.is_live(label));
    }

    #[test]
    fn test_detach_wrong_position_is_internal_error() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let root = state.root();
        let a = state.allocate(ElementKind::Label);
        let b = state.allocate(ElementKind::Label);
        state.attach(root, &body(), a, 0).unwrap();
        state.attach(root, &body(), b, 1).unwrap();
        let err = state.detach(root, &body(), a, 1).unwrap_err();
        assert!(matches!(err, DesignError::Internal { .. }));
    }

    #[test]
    fn test_stale_back_refs_are_invisible() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let style = state.allocate(ElementKind::Style);
        let label = state.allocate(ElementKind::Label);
        state.back_ref_add(style, BackRef::new(label, "style"));
        assert!(state.clients(style).is_empty());

        state
            .put_property(label, "style", Some(PropertyValue::element(style)))
            .unwrap();
        assert_eq!(state.clients(style), vec![BackRef::new(label, "style")]);
    }

    #[test]
    fn test_extends_chain_stops_on_cycle() {
        let mut state = DesignState::new(ElementKind::Library, true);
        let a = state.allocate(ElementKind::Label);
        let b = state.allocate(ElementKind::Label);
        state.put_extends(a, Some(ElementRefValue::Resolved(b))).unwrap();
        state.put_extends(b, Some(ElementRefValue::Resolved(a))).unwrap();
        assert_eq!(state.extends_chain(a), vec![b]);
    }

    #[test]
    fn test_cached_reference_moves_its_back_ref() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let root = state.root();
        let old = state.allocate(ElementKind::Style);
        let new = state.allocate(ElementKind::Style);
        let label = state.allocate(ElementKind::Label);
        state.attach(root, &body(), label, 0).unwrap();

        state
            .cache_reference(label, STYLE_PROP, ElementRefValue::Resolved(old))
            .unwrap();
        assert_eq!(state.back_refs().clients(old).count(), 1);

        state
            .cache_reference(label, STYLE_PROP, ElementRefValue::Resolved(new))
            .unwrap();
        assert_eq!(state.back_refs().clients(old).count(), 0);
        assert_eq!(state.clients(new), vec![BackRef::new(label, STYLE_PROP)]);

        state
            .cache_reference(label, STYLE_PROP, ElementRefValue::Unresolved("s1".to_string()))
            .unwrap();
        assert_eq!(state.back_refs().clients(new).count(), 0);
    }
}
