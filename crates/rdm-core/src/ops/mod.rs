//! Content commands
//!
//! Every command checks its preconditions before touching the design, then
//! runs as one transaction of activity records. A failure part-way through
//! rolls the transaction back before the error is returned.

pub mod content_ops;
pub mod extends_ops;
pub mod name_ops;
pub mod property_ops;
pub mod user_property_ops;

pub use content_ops::RemoveStrategy;

use crate::activity::{Action, Record};
use crate::errors::Result;
use crate::model::{BackRef, ContentLocation, ElementId, ElementRefValue, PropertyValue, EXTENDS_PROP};
use crate::module::Module;
use crate::schema::{slots, ElementKind, NameSpaceKind};

/// The module components slot, where inheritance order is enforced
pub(crate) fn is_components(module: &Module, container: ElementId, location: &ContentLocation) -> bool {
    container == module.state.root() && *location == ContentLocation::Slot(slots::COMPONENTS)
}

/// Name space `element` is registered in when held by `container`
///
/// Styles held by a theme are kept out of the module style name space.
pub(crate) fn name_space_of(
    module: &Module,
    element: ElementId,
    container: Option<ElementId>,
) -> Option<NameSpaceKind> {
    let kind = module.state.get(element)?.kind();
    if is_theme_style(module, kind, container) {
        return None;
    }
    module.schema.name_space(kind)
}

pub(crate) fn is_theme_style(module: &Module, kind: ElementKind, container: Option<ElementId>) -> bool {
    module.schema.is_kind_of(kind, ElementKind::Style)
        && container
            .and_then(|c| module.state.get(c))
            .is_some_and(|c| module.schema.is_kind_of(c.kind(), ElementKind::Theme))
}

/// Resolved reference held in `property` of `element` that is indexed
fn indexed_target(module: &Module, element: ElementId, property: &str) -> Option<ElementId> {
    let el = module.state.get(element)?;
    let target = if property == EXTENDS_PROP {
        el.extends_id()
    } else {
        el.local_property(property)
            .and_then(PropertyValue::as_element_ref)
            .and_then(ElementRefValue::resolved_id)
    }?;
    module
        .state
        .back_refs()
        .contains(target, &BackRef::new(element, property))
        .then_some(target)
}

fn back_ref_record(target: ElementId, referrer: ElementId, property: &str, action: Action) -> Record {
    Record::BackRef {
        target,
        back_ref: BackRef::new(referrer, property),
        action,
    }
}

/// Unindex the current reference of `property`, if it is indexed
pub(crate) fn release_reference(module: &mut Module, element: ElementId, property: &str) -> Result<()> {
    if let Some(target) = indexed_target(module, element, property) {
        module.execute(back_ref_record(target, element, property, Action::Remove))?;
    }
    Ok(())
}

/// Index the current reference of `property` when both ends are live
pub(crate) fn register_reference(module: &mut Module, element: ElementId, property: &str) -> Result<()> {
    let Some(el) = module.state.get(element) else {
        return Ok(());
    };
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
    let back_ref = BackRef::new(element, property);
    if module.state.is_live(element)
        && module.state.is_live(target)
        && !module.state.back_refs().contains(target, &back_ref)
    {
        module.execute(Record::BackRef {
            target,
            back_ref,
            action: Action::Add,
        })?;
    }
    Ok(())
}

/// Replace a local property value, keeping the reverse index in step
pub(crate) fn change_property(
    module: &mut Module,
    element: ElementId,
    property: &str,
    new: Option<PropertyValue>,
) -> Result<()> {
    let old = module.state.element(element)?.local_property(property).cloned();
    if old == new {
        return Ok(());
    }
    release_reference(module, element, property)?;
    module.execute(Record::Property {
        element,
        property: property.to_string(),
        old,
        new,
    })?;
    register_reference(module, element, property)
}

/// Replace the extends reference, keeping the reverse index in step
pub(crate) fn change_extends(
    module: &mut Module,
    element: ElementId,
    new: Option<ElementRefValue>,
) -> Result<()> {
    let old = module.state.element(element)?.extends().cloned();
    if old == new {
        return Ok(());
    }
    release_reference(module, element, EXTENDS_PROP)?;
    module.execute(Record::Extends { element, old, new })?;
    register_reference(module, element, EXTENDS_PROP)
}

/// Value a reference to a departing `target` is left with
pub(crate) fn unresolved_value(module: &Module, target: ElementId) -> Option<ElementRefValue> {
    module
        .state
        .get(target)
        .and_then(|el| el.name())
        .map(|name| ElementRefValue::Unresolved(name.to_string()))
}

/// Names of the element-reference properties set on `element`
pub(crate) fn reference_properties(module: &Module, element: ElementId) -> Vec<String> {
    let Some(el) = module.state.get(element) else {
        return Vec::new();
    };
    el.local_properties()
        .iter()
        .filter(|(_, value)| value.as_element_ref().is_some())
        .map(|(name, _)| name.clone())
        .collect()
}
