use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    change_extends, change_property, is_components, is_theme_style, name_space_of,
    reference_properties, register_reference, unresolved_value, user_property_ops,
};
use crate::activity::{Action, Record};
use crate::errors::{DesignError, Result};
use crate::model::{
    ContainerContext, ContentLocation, ElementId, ElementRefValue, PropertyValue, EXTENDS_PROP,
};
use crate::module::Module;
use crate::schema::{slots, ContentDefn, ContextRule, NameOption, NameSpaceKind};

/// What happens to references pointing at a removed element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoveStrategy {
    /// Clear the referring property
    #[default]
    Clear,
    /// Keep the reference as the removed element's name
    Unresolve,
}

/// Slot or content property definition, checking the container first
pub(crate) fn content_defn_of<'m>(
    module: &'m Module,
    container: ElementId,
    location: &ContentLocation,
) -> Result<ContentDefn<'m>> {
    let kind = module.state.element(container)?.kind();
    if !module.schema.is_container(kind) {
        return Err(DesignError::NotContainer { element: container });
    }
    module
        .schema
        .content_defn(kind, location)
        .ok_or_else(|| DesignError::SlotNotFound {
            element: container,
            location: location.clone(),
        })
}

/// Add a detached element to a content list
///
/// # Arguments
/// * `container` - Element receiving the content
/// * `content` - Detached element to add, with its subtree
/// * `location` - Slot or content property of the container
/// * `position` - Insertion index, `None` appends
///
/// # Errors
/// Checked in this order, before anything changes:
/// * `ContentAlreadyContained` - Content already has a container
/// * `NotContainer` - Container kind holds no contents
/// * `SlotNotFound` - Container kind has no such location
/// * `WrongType` - Location does not accept the content kind
/// * `Recursive` - Container sits inside the content
/// * `SlotIsFull` - Single-cardinality location already holds an element
/// * `InvalidPosition` - Position past the end of the list
/// * `InvalidContextContainment` - A schema context rule or the components
///   inheritance order forbids the placement
/// * `NameRequired` / `NameForbidden` / `DuplicateName` - For the content or
///   any element of its subtree
pub fn add(
    module: &mut Module,
    container: ElementId,
    content: ElementId,
    location: ContentLocation,
    position: Option<usize>,
) -> Result<()> {
    module.logged("add_content", Some(content), |m| {
        add_with(m, container, content, location, position, false)
    })
}

/// [`add`] that leaves missing and duplicate names to the validators
pub(crate) fn add_with(
    module: &mut Module,
    container: ElementId,
    content: ElementId,
    location: ContentLocation,
    position: Option<usize>,
    lenient: bool,
) -> Result<()> {
    let position = check_add(module, container, content, &location, position, lenient)?;
    let kind = module.state.element(content)?.kind();
    let record = Record::Content {
        container,
        location: location.clone(),
        content,
        position,
        action: Action::Add,
        notify_content: module.schema.notifies_on_attach(kind),
    };

    module.run_in_transaction("add", |m| {
        m.execute(record)?;
        if m.state.is_live(content) {
            register_subtree(m, content)?;
        }
        Ok(())
    })?;
    tracing::debug!(%container, %content, %location, position, "content added");
    Ok(())
}

fn check_add(
    module: &Module,
    container: ElementId,
    content: ElementId,
    location: &ContentLocation,
    position: Option<usize>,
    lenient: bool,
) -> Result<usize> {
    let state = &module.state;
    let content_el = state.element(content)?;
    let container_el = state.element(container)?;
    if let Some(holder) = content_el.container_id() {
        return Err(DesignError::ContentAlreadyContained {
            content,
            container: holder,
        });
    }

    let defn = content_defn_of(module, container, location)?;
    if !module.schema.accepts(defn.content_types, content_el.kind()) {
        return Err(DesignError::WrongType {
            container,
            location: location.clone(),
            kind: content_el.kind(),
        });
    }
    if content == state.root() || state.is_within(container, content) {
        return Err(DesignError::Recursive { container, content });
    }

    let len = container_el.content(location).len();
    if defn.is_single() && len > 0 {
        return Err(DesignError::SlotIsFull {
            container,
            location: location.clone(),
        });
    }
    let position = position.unwrap_or(len);
    if position > len {
        return Err(DesignError::InvalidPosition {
            location: location.clone(),
            position,
            len,
        });
    }

    check_context(module, container, location, content, position)?;
    check_names(module, container, content, lenient)?;
    Ok(position)
}

/// Schema context rules, and inheritance order in the components slot
fn check_context(
    module: &Module,
    container: ElementId,
    location: &ContentLocation,
    content: ElementId,
    position: usize,
) -> Result<()> {
    let state = &module.state;
    let schema = &module.schema;
    let kind_of = |id: ElementId, base| {
        state
            .get(id)
            .is_some_and(|el| schema.is_kind_of(el.kind(), base))
    };

    let subtree = state.subtree(content);
    for rule in schema.context_rules() {
        match rule {
            ContextRule::ForbiddenUnder {
                content: forbidden,
                ancestor,
            } => {
                let under = std::iter::once(container)
                    .chain(state.containers_of(container))
                    .any(|id| kind_of(id, *ancestor));
                if under && subtree.iter().any(|id| kind_of(*id, *forbidden)) {
                    return Err(DesignError::InvalidContextContainment {
                        container,
                        content,
                        reason: format!("a {} may not appear under a {}", forbidden, ancestor),
                    });
                }
            }
        }
    }

    if is_components(module, container, location) {
        let list = state.element(container)?.content(location);
        let ancestors = state.extends_chain(content);
        let derived = state.all_derived(content);
        let misplaced = list.iter().enumerate().any(|(index, id)| {
            (index >= position && ancestors.contains(id)) || (index < position && derived.contains(id))
        });
        if misplaced {
            return Err(DesignError::InvalidContextContainment {
                container,
                content,
                reason: "components must follow the elements they extend".to_string(),
            });
        }
    }
    Ok(())
}

fn check_names(module: &Module, container: ElementId, content: ElementId, lenient: bool) -> Result<()> {
    let state = &module.state;
    let live = state.is_live(container);
    let mut claimed: BTreeMap<(NameSpaceKind, &str), ElementId> = BTreeMap::new();

    for id in state.subtree(content) {
        let el = state.element(id)?;
        let holder = if id == content {
            Some(container)
        } else {
            el.container_id()
        };
        let option = module.schema.name_option(el.kind());
        let Some(name) = el.name() else {
            if option == NameOption::Required && !lenient {
                return Err(DesignError::NameRequired { element: id });
            }
            continue;
        };
        if option == NameOption::Forbidden {
            return Err(DesignError::NameForbidden { element: id });
        }
        if lenient {
            continue;
        }

        if is_theme_style(module, el.kind(), holder) {
            if let Some(theme) = holder.filter(|_| id == content) {
                check_theme_style_name(module, theme, id, name)?;
            }
            continue;
        }
        let Some(space) = module.schema.name_space(el.kind()) else {
            continue;
        };
        if !live {
            continue;
        }
        let taken = state
            .name_spaces()
            .lookup(space, name)
            .is_some_and(|holder| holder != id);
        if taken || claimed.insert((space, name), id).is_some() {
            return Err(DesignError::DuplicateName {
                name: name.to_string(),
                scope: space.to_string(),
            });
        }
    }
    Ok(())
}

/// Styles of one theme must not share a name
pub(crate) fn check_theme_style_name(
    module: &Module,
    theme: ElementId,
    style: ElementId,
    name: &str,
) -> Result<()> {
    let clash = module
        .state
        .element(theme)?
        .content(&slots::STYLES.into())
        .iter()
        .filter(|id| **id != style)
        .any(|id| module.state.get(*id).and_then(|s| s.name()) == Some(name));
    if clash {
        return Err(DesignError::DuplicateName {
            name: name.to_string(),
            scope: "theme".to_string(),
        });
    }
    Ok(())
}

/// Names and references of a subtree that just became live
fn register_subtree(m: &mut Module, root: ElementId) -> Result<()> {
    let module_root = m.state.root();
    for id in m.state.subtree(root) {
        let (name, holder) = {
            let el = m.state.element(id)?;
            (el.name().map(str::to_string), el.container_id())
        };
        if let (Some(name), Some(space)) = (name, name_space_of(m, id, holder)) {
            if m.state.name_spaces().lookup(space, &name).is_none() {
                m.execute(Record::NameSpace {
                    space,
                    name,
                    element: id,
                    action: Action::Add,
                    module: module_root,
                })?;
            }
        }
        for property in reference_properties(m, id) {
            bind_reference(m, id, &property)?;
        }
        bind_reference(m, id, EXTENDS_PROP)?;
    }
    Ok(())
}

/// Index a resolved reference, or fall back to the target's name when the
/// target is not part of the design
fn bind_reference(m: &mut Module, element: ElementId, property: &str) -> Result<()> {
    let el = m.state.element(element)?;
    let target = if property == EXTENDS_PROP {
        el.extends_id()
    } else {
        el.local_property(property)
            .and_then(PropertyValue::as_element_ref)
            .and_then(ElementRefValue::resolved_id)
    };
    let Some(target) = target else {
        return Ok(());
    };
    if m.state.is_live(target) {
        return register_reference(m, element, property);
    }
    let fallback = unresolved_value(m, target);
    if property == EXTENDS_PROP {
        change_extends(m, element, fallback)
    } else {
        change_property(m, element, property, fallback.map(PropertyValue::ElementRef))
    }
}

/// Remove an element from its container
///
/// Children are removed first. References to the element are cleared or
/// turned into names per `strategy`; its own references, style and
/// extends are released; elements extending it are re-parented onto its own
/// parent when it has one.
///
/// # Errors
/// * `NotContained` - Element has no container
/// * `ContentNotFound` - Container list does not hold the element
/// * `DropForbidden` - Element kind cannot be dropped
/// * `HasDescendants` - Element sits in the components slot, others extend
///   it and it has no parent to re-parent them onto
pub fn remove(module: &mut Module, content: ElementId, strategy: RemoveStrategy) -> Result<()> {
    module.logged("remove_content", Some(content), |m| remove_content(m, content, strategy))
}

fn remove_content(module: &mut Module, content: ElementId, strategy: RemoveStrategy) -> Result<()> {
    check_remove(module, content)?;
    module.run_in_transaction("remove", |m| remove_tree(m, content, strategy))?;
    tracing::debug!(%content, ?strategy, "content removed");
    Ok(())
}

fn check_remove(module: &Module, content: ElementId) -> Result<ContainerContext> {
    let el = module.state.element(content)?;
    let ctx = el
        .container()
        .cloned()
        .ok_or(DesignError::NotContained { content })?;
    content_defn_of(module, ctx.element, &ctx.location)?;
    if module
        .state
        .element(ctx.element)?
        .position_of(&ctx.location, content)
        .is_none()
    {
        return Err(DesignError::ContentNotFound {
            container: ctx.element,
            location: ctx.location,
            content,
        });
    }
    if !module.schema.is_droppable(el.kind()) {
        return Err(DesignError::DropForbidden { content });
    }
    if is_components(module, ctx.element, &ctx.location)
        && el.extends_id().is_none()
        && !module.state.derived_elements(content).is_empty()
    {
        return Err(DesignError::HasDescendants { content });
    }
    Ok(ctx)
}

fn remove_tree(m: &mut Module, content: ElementId, strategy: RemoveStrategy) -> Result<()> {
    // Children first, last to first
    let children: Vec<ElementId> = m
        .state
        .element(content)?
        .content_lists()
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect();
    for child in children.into_iter().rev() {
        m.run_in_transaction("remove", |m| remove_tree(m, child, strategy))?;
    }

    let defns: Vec<String> = m
        .state
        .element(content)?
        .user_properties()
        .map(|d| d.name.clone())
        .collect();
    for name in defns {
        user_property_ops::drop_definition(m, content, &name)?;
    }

    // References pointing at the element
    let replacement = match strategy {
        RemoveStrategy::Clear => None,
        RemoveStrategy::Unresolve => unresolved_value(m, content),
    };
    for client in m.state.clients(content) {
        if !client.is_extends() {
            let value = replacement.clone().map(PropertyValue::ElementRef);
            change_property(m, client.referrer, &client.property, value)?;
        }
    }

    // Its own references, style included
    for property in reference_properties(m, content) {
        change_property(m, content, &property, None)?;
    }

    // Derived elements move up to the element's own parent
    let parent = m.state.element(content)?.extends_id();
    for derived in m.state.derived_elements(content) {
        let value = match parent {
            Some(parent) => Some(ElementRefValue::Resolved(parent)),
            None => replacement.clone(),
        };
        change_extends(m, derived, value)?;
    }
    change_extends(m, content, None)?;

    let (name, ctx) = {
        let el = m.state.element(content)?;
        let ctx = el
            .container()
            .cloned()
            .ok_or(DesignError::NotContained { content })?;
        (el.name().map(str::to_string), ctx)
    };
    if let (Some(name), Some(space)) = (name, name_space_of(m, content, Some(ctx.element))) {
        if m.state.name_spaces().lookup(space, &name) == Some(content) {
            let module_root = m.state.root();
            m.execute(Record::NameSpace {
                space,
                name,
                element: content,
                action: Action::Remove,
                module: module_root,
            })?;
        }
    }

    let position = m
        .state
        .element(ctx.element)?
        .position_of(&ctx.location, content)
        .ok_or_else(|| DesignError::ContentNotFound {
            container: ctx.element,
            location: ctx.location.clone(),
            content,
        })?;
    m.execute(Record::Content {
        container: ctx.element,
        location: ctx.location,
        content,
        position,
        action: Action::Remove,
        notify_content: true,
    })
}

/// Move an element to another container or content location
///
/// Moving within the same location delegates to [`move_position`].
///
/// # Errors
/// The containment errors of [`add`] for the destination, plus:
/// * `NotContained` - Element has no container
/// * `DropForbidden` - Element kind cannot be dropped
/// * `MoveForbidden` - The move would change whether the element is part of
///   the design, or others extend it and it would leave the components slot
pub fn move_to(
    module: &mut Module,
    content: ElementId,
    container: ElementId,
    location: ContentLocation,
    position: Option<usize>,
) -> Result<()> {
    module.logged("move_content", Some(content), |m| {
        move_content(m, content, container, location, position)
    })
}

fn move_content(
    module: &mut Module,
    content: ElementId,
    container: ElementId,
    location: ContentLocation,
    position: Option<usize>,
) -> Result<()> {
    let from = module
        .state
        .element(content)?
        .container()
        .cloned()
        .ok_or(DesignError::NotContained { content })?;
    if from.element == container && from.location == location {
        let len = module.state.element(container)?.content(&location).len();
        return move_position(module, content, position.unwrap_or(len));
    }

    let (from_position, position) = check_move(module, content, &from, container, &location, position)?;
    let module_root = module.state.root();
    let name = module.state.element(content)?.name().map(str::to_string);
    let old_space = name_space_of(module, content, Some(from.element));
    let new_space = name_space_of(module, content, Some(container));
    let live = module.state.is_live(container);

    module.run_in_transaction("move", |m| {
        if let (Some(name), Some(space), true) = (&name, old_space, old_space != new_space) {
            if m.state.name_spaces().lookup(space, name) == Some(content) {
                m.execute(Record::NameSpace {
                    space,
                    name: name.clone(),
                    element: content,
                    action: Action::Remove,
                    module: module_root,
                })?;
            }
        }
        m.execute(Record::Content {
            container: from.element,
            location: from.location.clone(),
            content,
            position: from_position,
            action: Action::Remove,
            notify_content: false,
        })?;
        m.execute(Record::Content {
            container,
            location: location.clone(),
            content,
            position,
            action: Action::Add,
            notify_content: false,
        })?;
        if let (Some(name), Some(space), true) = (&name, new_space, live && old_space != new_space) {
            m.execute(Record::NameSpace {
                space,
                name: name.clone(),
                element: content,
                action: Action::Add,
                module: module_root,
            })?;
        }
        Ok(())
    })?;
    tracing::debug!(%content, %container, %location, position, "content moved");
    Ok(())
}

fn check_move(
    module: &Module,
    content: ElementId,
    from: &ContainerContext,
    container: ElementId,
    location: &ContentLocation,
    position: Option<usize>,
) -> Result<(usize, usize)> {
    let state = &module.state;
    content_defn_of(module, from.element, &from.location)?;
    let from_position = state
        .element(from.element)?
        .position_of(&from.location, content)
        .ok_or_else(|| DesignError::ContentNotFound {
            container: from.element,
            location: from.location.clone(),
            content,
        })?;
    let el = state.element(content)?;
    if !module.schema.is_droppable(el.kind()) {
        return Err(DesignError::DropForbidden { content });
    }

    let defn = content_defn_of(module, container, location)?;
    if !module.schema.accepts(defn.content_types, el.kind()) {
        return Err(DesignError::WrongType {
            container,
            location: location.clone(),
            kind: el.kind(),
        });
    }
    if state.is_within(container, content) {
        return Err(DesignError::Recursive { container, content });
    }
    let len = state.element(container)?.content(location).len();
    if defn.is_single() && len > 0 {
        return Err(DesignError::SlotIsFull {
            container,
            location: location.clone(),
        });
    }
    let position = position.unwrap_or(len);
    if position > len {
        return Err(DesignError::InvalidPosition {
            location: location.clone(),
            position,
            len,
        });
    }

    if state.is_live(from.element) != state.is_live(container) {
        return Err(DesignError::MoveForbidden {
            content,
            reason: "the move would take the element in or out of the design".to_string(),
        });
    }
    if is_components(module, from.element, &from.location)
        && !state.derived_elements(content).is_empty()
    {
        return Err(DesignError::MoveForbidden {
            content,
            reason: "elements that others extend must stay in the components slot".to_string(),
        });
    }
    check_context(module, container, location, content, position)?;

    if let Some(name) = el.name() {
        if is_theme_style(module, el.kind(), Some(container)) {
            check_theme_style_name(module, container, content, name)?;
        } else if let Some(space) = name_space_of(module, content, Some(container)) {
            let taken = state.is_live(container)
                && state
                    .name_spaces()
                    .lookup(space, name)
                    .is_some_and(|holder| holder != content);
            if taken {
                return Err(DesignError::DuplicateName {
                    name: name.to_string(),
                    scope: space.to_string(),
                });
            }
        }
    }
    Ok((from_position, position))
}

/// Move an element within its content list
///
/// `new_position` is an insertion index into the current list, clamped to
/// its length. Moving onto the current index, or within a
/// single-cardinality location, changes nothing and records nothing.
///
/// # Errors
/// * `NotContained` - Element has no container
/// * `MoveForbidden` - In the components slot the element would no longer
///   follow every element it extends and precede every element extending it
pub fn move_position(module: &mut Module, content: ElementId, new_position: usize) -> Result<()> {
    module.logged("move_position", Some(content), |m| reorder_content(m, content, new_position))
}

fn reorder_content(module: &mut Module, content: ElementId, new_position: usize) -> Result<()> {
    let ctx = module
        .state
        .element(content)?
        .container()
        .cloned()
        .ok_or(DesignError::NotContained { content })?;
    if content_defn_of(module, ctx.element, &ctx.location)?.is_single() {
        return Ok(());
    }

    let mut order = module.state.element(ctx.element)?.content(&ctx.location).to_vec();
    let from = order
        .iter()
        .position(|id| *id == content)
        .ok_or_else(|| DesignError::ContentNotFound {
            container: ctx.element,
            location: ctx.location.clone(),
            content,
        })?;
    let clamped = new_position.min(order.len());
    let to = if clamped > from { clamped - 1 } else { clamped };
    if to == from {
        tracing::debug!(%content, position = from, "move within slot is a no-op");
        return Ok(());
    }

    if is_components(module, ctx.element, &ctx.location) {
        order.remove(from);
        order.insert(to, content);
        check_inheritance_order(module, &order, content)?;
    }

    module.run_in_transaction("move position", |m| {
        m.execute(Record::MoveContent {
            container: ctx.element,
            location: ctx.location.clone(),
            content,
            from,
            to,
        })
    })
}

fn check_inheritance_order(module: &Module, order: &[ElementId], content: ElementId) -> Result<()> {
    let index_of = |id: ElementId| order.iter().position(|x| *x == id);
    let Some(at) = index_of(content) else {
        return Ok(());
    };
    let ancestor_after = module
        .state
        .extends_chain(content)
        .into_iter()
        .any(|a| index_of(a).is_some_and(|i| i > at));
    let derived_before = module
        .state
        .all_derived(content)
        .into_iter()
        .any(|d| index_of(d).is_some_and(|i| i < at));
    if ancestor_after || derived_before {
        return Err(DesignError::MoveForbidden {
            content,
            reason: "components must follow the elements they extend".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{extends_ops, name_ops, property_ops};
    use crate::schema::ElementKind;

    fn named(module: &mut Module, kind: ElementKind, name: &str) -> ElementId {
        let id = module.create_element(kind).unwrap();
        name_ops::set_name(module, id, Some(name)).unwrap();
        id
    }

    #[test]
    fn test_add_checks_run_in_order() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let label = module.create_element(ElementKind::Label).unwrap();
        let other = module.create_element(ElementKind::Label).unwrap();

        let err = add(&mut module, other, label, slots::BODY.into(), None).unwrap_err();
        assert_eq!(err, DesignError::NotContainer { element: other });

        let err = add(&mut module, root, label, slots::CELLS.into(), None).unwrap_err();
        assert!(matches!(err, DesignError::SlotNotFound { .. }));

        let err = add(&mut module, root, label, slots::STYLES.into(), None).unwrap_err();
        assert!(matches!(err, DesignError::WrongType { .. }));

        let err = add(&mut module, root, label, slots::BODY.into(), Some(3)).unwrap_err();
        assert!(matches!(err, DesignError::InvalidPosition { .. }));

        add(&mut module, root, label, slots::BODY.into(), None).unwrap();
        let err = add(&mut module, root, label, slots::BODY.into(), None).unwrap_err();
        assert_eq!(
            err,
            DesignError::ContentAlreadyContained {
                content: label,
                container: root
            }
        );
    }

    #[test]
    fn test_add_into_own_subtree_is_recursive() {
        let mut module = Module::report_design().unwrap();
        let grid = module.create_element(ElementKind::Grid).unwrap();
        let row = module.create_element(ElementKind::Row).unwrap();
        let cell = module.create_element(ElementKind::Cell).unwrap();
        add(&mut module, grid, row, slots::ROWS.into(), None).unwrap();
        add(&mut module, row, cell, slots::CELLS.into(), None).unwrap();

        let err = add(&mut module, cell, grid, slots::CONTENT.into(), None).unwrap_err();
        assert_eq!(err, DesignError::Recursive { container: cell, content: grid });

        let root = module.root();
        add(&mut module, root, grid, slots::BODY.into(), None).unwrap();
        let err = move_to(&mut module, grid, cell, slots::CONTENT.into(), None).unwrap_err();
        assert_eq!(err, DesignError::Recursive { container: cell, content: grid });
    }

    #[test]
    fn test_single_slot_is_full() {
        let mut module = Module::report_design().unwrap();
        let dimension = module.create_element(ElementKind::TabularDimension).unwrap();
        let first = module.create_element(ElementKind::TabularHierarchy).unwrap();
        let second = module.create_element(ElementKind::TabularHierarchy).unwrap();
        let hierarchy = ContentLocation::property("hierarchy");
        add(&mut module, dimension, first, hierarchy.clone(), None).unwrap();
        let err = add(&mut module, dimension, second, hierarchy, None).unwrap_err();
        assert!(matches!(err, DesignError::SlotIsFull { .. }));
    }

    #[test]
    fn test_listing_under_master_page_is_invalid_context() {
        let mut module = Module::report_design().unwrap();
        let page = module.create_element(ElementKind::SimpleMasterPage).unwrap();
        let grid = module.create_element(ElementKind::Grid).unwrap();
        let row = module.create_element(ElementKind::Row).unwrap();
        let cell = module.create_element(ElementKind::Cell).unwrap();
        let table = module.create_element(ElementKind::Table).unwrap();
        add(&mut module, grid, row, slots::ROWS.into(), None).unwrap();
        add(&mut module, row, cell, slots::CELLS.into(), None).unwrap();
        add(&mut module, cell, table, slots::CONTENT.into(), None).unwrap();

        let err = add(&mut module, page, grid, slots::PAGE_HEADER.into(), None).unwrap_err();
        assert!(matches!(err, DesignError::InvalidContextContainment { .. }));
        assert!(module.element(page).unwrap().content(&slots::PAGE_HEADER.into()).is_empty());
    }

    #[test]
    fn test_add_registers_subtree_names() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let grid = named(&mut module, ElementKind::Grid, "outer");
        let row = module.create_element(ElementKind::Row).unwrap();
        let cell = module.create_element(ElementKind::Cell).unwrap();
        let label = named(&mut module, ElementKind::Label, "inner");
        add(&mut module, grid, row, slots::ROWS.into(), None).unwrap();
        add(&mut module, row, cell, slots::CELLS.into(), None).unwrap();
        add(&mut module, cell, label, slots::CONTENT.into(), None).unwrap();
        assert_eq!(module.find(NameSpaceKind::Element, "inner"), None);

        add(&mut module, root, grid, slots::BODY.into(), None).unwrap();
        assert_eq!(module.find(NameSpaceKind::Element, "outer"), Some(grid));
        assert_eq!(module.find(NameSpaceKind::Element, "inner"), Some(label));

        let clash = named(&mut module, ElementKind::Label, "inner");
        let err = add(&mut module, root, clash, slots::BODY.into(), None).unwrap_err();
        assert!(matches!(err, DesignError::DuplicateName { .. }));
    }

    #[test]
    fn test_remove_unresolve_keeps_name_reference() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let style = named(&mut module, ElementKind::Style, "s1");
        add(&mut module, root, style, slots::STYLES.into(), None).unwrap();
        let label = module.create_element(ElementKind::Label).unwrap();
        add(&mut module, root, label, slots::BODY.into(), None).unwrap();
        property_ops::set_style(&mut module, label, Some(style)).unwrap();
        assert_eq!(module.state().clients(style).len(), 1);

        remove(&mut module, style, RemoveStrategy::Unresolve).unwrap();
        assert_eq!(
            module.element(label).unwrap().local_property("style"),
            Some(&PropertyValue::element_name("s1"))
        );
        assert_eq!(module.find_style("s1"), None);

        module.undo().unwrap();
        assert_eq!(
            module.element(label).unwrap().local_property("style"),
            Some(&PropertyValue::element(style))
        );
        assert_eq!(module.state().clients(style).len(), 1);
    }

    #[test]
    fn test_remove_clear_drops_reference_and_reparents() {
        let mut module = Module::library().unwrap();
        let root = module.root();
        let base = named(&mut module, ElementKind::Label, "base");
        let mid = named(&mut module, ElementKind::Label, "mid");
        let leaf = named(&mut module, ElementKind::Label, "leaf");
        for id in [base, mid, leaf] {
            add(&mut module, root, id, slots::COMPONENTS.into(), None).unwrap();
        }
        extends_ops::set_extends(&mut module, mid, Some(base)).unwrap();
        extends_ops::set_extends(&mut module, leaf, Some(mid)).unwrap();

        remove(&mut module, mid, RemoveStrategy::Clear).unwrap();
        assert_eq!(module.element(leaf).unwrap().extends_id(), Some(base));
        assert_eq!(module.state().derived_elements(base), vec![leaf]);
    }

    #[test]
    fn test_remove_root_level_parent_without_parent_has_descendants() {
        let mut module = Module::library().unwrap();
        let root = module.root();
        let base = named(&mut module, ElementKind::Label, "base");
        let child = named(&mut module, ElementKind::Label, "child");
        add(&mut module, root, base, slots::COMPONENTS.into(), None).unwrap();
        add(&mut module, root, child, slots::COMPONENTS.into(), None).unwrap();
        extends_ops::set_extends(&mut module, child, Some(base)).unwrap();

        let err = remove(&mut module, base, RemoveStrategy::Clear).unwrap_err();
        assert_eq!(err, DesignError::HasDescendants { content: base });
    }

    #[test]
    fn test_root_cannot_be_dropped() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let err = remove(&mut module, root, RemoveStrategy::Clear).unwrap_err();
        assert_eq!(err, DesignError::NotContained { content: root });
    }

    #[test]
    fn test_theme_styles_are_unique_within_their_theme() {
        let mut module = Module::library().unwrap();
        let root = module.root();
        let first = named(&mut module, ElementKind::Theme, "t1");
        let second = named(&mut module, ElementKind::Theme, "t2");
        add(&mut module, root, first, slots::THEMES.into(), None).unwrap();
        add(&mut module, root, second, slots::THEMES.into(), None).unwrap();

        let a = named(&mut module, ElementKind::Style, "s1");
        let b = named(&mut module, ElementKind::Style, "s1");
        add(&mut module, first, a, slots::STYLES.into(), None).unwrap();
        add(&mut module, second, b, slots::STYLES.into(), None).unwrap();
        assert_eq!(module.find_style("s1"), None);

        let err = move_to(&mut module, b, first, slots::STYLES.into(), None).unwrap_err();
        assert_eq!(
            err,
            DesignError::DuplicateName {
                name: "s1".to_string(),
                scope: "theme".to_string()
            }
        );
        assert_eq!(module.element(b).unwrap().container_id(), Some(second));
    }

    #[test]
    fn test_move_cannot_change_liveness() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let label = module.create_element(ElementKind::Label).unwrap();
        add(&mut module, root, label, slots::BODY.into(), None).unwrap();
        let grid = module.create_element(ElementKind::Grid).unwrap();
        let row = module.create_element(ElementKind::Row).unwrap();
        let cell = module.create_element(ElementKind::Cell).unwrap();
        add(&mut module, grid, row, slots::ROWS.into(), None).unwrap();
        add(&mut module, row, cell, slots::CELLS.into(), None).unwrap();

        let err = move_to(&mut module, label, cell, slots::CONTENT.into(), None).unwrap_err();
        assert!(matches!(err, DesignError::MoveForbidden { .. }));
    }

    #[test]
    fn test_move_position_adjusts_for_removal_shift() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let ids: Vec<ElementId> = (0..3)
            .map(|_| {
                let id = module.create_element(ElementKind::Label).unwrap();
                add(&mut module, root, id, slots::BODY.into(), None).unwrap();
                id
            })
            .collect();
        let depth = module.stack().undo_depth();

        // Inserting before the next element changes nothing
        move_position(&mut module, ids[0], 1).unwrap();
        assert_eq!(module.stack().undo_depth(), depth);

        move_position(&mut module, ids[0], 3).unwrap();
        assert_eq!(
            module.element(root).unwrap().content(&slots::BODY.into()),
            &[ids[1], ids[2], ids[0]]
        );
        move_position(&mut module, ids[0], 0).unwrap();
        assert_eq!(
            module.element(root).unwrap().content(&slots::BODY.into()),
            &[ids[0], ids[1], ids[2]]
        );
    }
}
