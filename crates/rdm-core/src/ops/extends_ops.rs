use super::{change_extends, is_components};
use crate::errors::{DesignError, Result};
use crate::model::{ElementId, ElementRefValue};
use crate::module::Module;

/// Make `element` extend `parent`, or drop its parent with `None`
///
/// # Arguments
/// * `module` - Design being edited
/// * `element` - Element whose parent changes
/// * `parent` - New parent, of exactly the same kind as `element`
///
/// # Errors
/// * `ExtendsForbidden` - Kind cannot extend, a live element would extend a
///   detached one, or the parent sits after the element in the components slot
/// * `WrongExtensionType` - Kinds differ
/// * `CircularExtends` - `parent` already inherits from `element`
pub fn set_extends(module: &mut Module, element: ElementId, parent: Option<ElementId>) -> Result<()> {
    module.logged("set_extends", Some(element), |m| change_parent(m, element, parent))
}

fn change_parent(module: &mut Module, element: ElementId, parent: Option<ElementId>) -> Result<()> {
    let kind = module.state.element(element)?.kind();
    if !module.schema.is_extendable(kind) {
        return Err(DesignError::ExtendsForbidden {
            element,
            reason: format!("{} elements cannot extend", kind),
        });
    }
    let Some(parent) = parent else {
        return module.run_in_transaction("set extends", |m| change_extends(m, element, None));
    };
    if module.state.element(element)?.extends_id() == Some(parent) {
        return Ok(());
    }

    let parent_kind = module.state.element(parent)?.kind();
    if parent_kind != kind {
        return Err(DesignError::WrongExtensionType { element, parent });
    }
    if parent == element || module.state.extends_chain(parent).contains(&element) {
        return Err(DesignError::CircularExtends { element, parent });
    }
    if module.state.is_live(element) && !module.state.is_live(parent) {
        return Err(DesignError::ExtendsForbidden {
            element,
            reason: "parent is not part of the design".to_string(),
        });
    }
    check_components_order(module, element, parent)?;

    module.run_in_transaction("set extends", |m| {
        change_extends(m, element, Some(ElementRefValue::Resolved(parent)))
    })?;
    tracing::debug!(%element, %parent, "extends set");
    Ok(())
}

/// Both in the components slot: the parent must come first
fn check_components_order(module: &Module, element: ElementId, parent: ElementId) -> Result<()> {
    let position = |id: ElementId| {
        let ctx = module.state.get(id)?.container()?;
        if !is_components(module, ctx.element, &ctx.location) {
            return None;
        }
        module.state.get(ctx.element)?.position_of(&ctx.location, id)
    };
    if let (Some(at), Some(parent_at)) = (position(element), position(parent)) {
        if parent_at > at {
            return Err(DesignError::ExtendsForbidden {
                element,
                reason: "parent must come before the element in components".to_string(),
            });
        }
    }
    Ok(())
}

/// Make `element` extend the live element named `name`
///
/// # Errors
/// `UnresolvedReference` when no element of the same kind holds the name,
/// plus everything [`set_extends`] raises.
pub fn set_extends_name(module: &mut Module, element: ElementId, name: &str) -> Result<()> {
    module.logged("set_extends", Some(element), |m| link_parent_by_name(m, element, name))
}

fn link_parent_by_name(module: &mut Module, element: ElementId, name: &str) -> Result<()> {
    let kind = module.state.element(element)?.kind();
    let parent = module
        .schema
        .name_space(kind)
        .and_then(|space| module.state.name_spaces().lookup(space, name.trim()))
        .filter(|p| module.state.get(*p).is_some_and(|el| el.kind() == kind));
    match parent {
        Some(parent) => set_extends(module, element, Some(parent)),
        None => Err(DesignError::UnresolvedReference {
            element,
            property: crate::model::EXTENDS_PROP.to_string(),
            target: name.to_string(),
        }),
    }
}

/// Record a parent by name without resolving it
///
/// Used while loading a design, when the parent may be defined further on;
/// semantic validation resolves or reports the name afterwards.
pub(crate) fn put_extends_name(module: &mut Module, element: ElementId, name: &str) -> Result<()> {
    let kind = module.state.element(element)?.kind();
    if !module.schema.is_extendable(kind) {
        return Err(DesignError::ExtendsForbidden {
            element,
            reason: format!("{} elements cannot extend", kind),
        });
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(DesignError::InvalidValue {
            property: crate::model::EXTENDS_PROP.to_string(),
            reason: "parent name is blank".to_string(),
        });
    }
    let value = ElementRefValue::Unresolved(name.to_string());
    module.run_in_transaction("set extends", |m| change_extends(m, element, Some(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{content_ops, name_ops};
    use crate::schema::{slots, ElementKind};

    fn component(module: &mut Module, name: &str) -> ElementId {
        let root = module.root();
        let id = module.create_element(ElementKind::Label).unwrap();
        name_ops::set_name(module, id, Some(name)).unwrap();
        content_ops::add(module, root, id, slots::COMPONENTS.into(), None).unwrap();
        id
    }

    #[test]
    fn test_extends_checks() {
        let mut module = Module::library().unwrap();
        let a = component(&mut module, "a");
        let b = component(&mut module, "b");
        set_extends(&mut module, b, Some(a)).unwrap();
        assert_eq!(module.state().derived_elements(a), vec![b]);

        assert_eq!(
            set_extends(&mut module, a, Some(b)).unwrap_err(),
            DesignError::CircularExtends { element: a, parent: b }
        );
        assert_eq!(
            set_extends(&mut module, a, Some(a)).unwrap_err(),
            DesignError::CircularExtends { element: a, parent: a }
        );

        let root = module.root();
        let text = module.create_element(ElementKind::Text).unwrap();
        content_ops::add(&mut module, root, text, slots::COMPONENTS.into(), None).unwrap();
        assert_eq!(
            set_extends(&mut module, text, Some(a)).unwrap_err(),
            DesignError::WrongExtensionType { element: text, parent: a }
        );
    }

    #[test]
    fn test_parent_must_precede_in_components() {
        let mut module = Module::library().unwrap();
        let first = component(&mut module, "first");
        let second = component(&mut module, "second");
        let err = set_extends(&mut module, first, Some(second)).unwrap_err();
        assert!(matches!(err, DesignError::ExtendsForbidden { .. }));
    }

    #[test]
    fn test_clearing_extends_is_undoable() {
        let mut module = Module::library().unwrap();
        let a = component(&mut module, "a");
        let b = component(&mut module, "b");
        set_extends_name(&mut module, b, "a").unwrap();
        set_extends(&mut module, b, None).unwrap();
        assert!(module.state().derived_elements(a).is_empty());
        module.undo().unwrap();
        assert_eq!(module.element(b).unwrap().extends_id(), Some(a));
        assert_eq!(module.state().derived_elements(a), vec![b]);
    }

    #[test]
    fn test_unknown_parent_name_is_unresolved() {
        let mut module = Module::library().unwrap();
        let a = component(&mut module, "a");
        let err = set_extends_name(&mut module, a, "missing").unwrap_err();
        assert!(matches!(err, DesignError::UnresolvedReference { .. }));
    }
}
