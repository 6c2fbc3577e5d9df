use super::change_property;
use crate::activity::{Action, Record};
use crate::errors::{DesignError, Result};
use crate::model::{ElementId, UserPropertyDefn, EXTENDS_PROP};
use crate::module::Module;

/// Define a user property on an element
///
/// The property becomes settable on the element and on everything that
/// extends it.
///
/// # Errors
/// * `InvalidValue` - Blank name, or a content-list kind
/// * `DuplicateProperty` - The name is taken by a schema property, a user
///   property visible from the element, or one defined by a derived element
pub fn add_user_property(module: &mut Module, element: ElementId, defn: UserPropertyDefn) -> Result<()> {
    module.logged("add_user_property", Some(element), |m| define_user_property(m, element, defn))
}

fn define_user_property(module: &mut Module, element: ElementId, defn: UserPropertyDefn) -> Result<()> {
    let name = defn.name.trim().to_string();
    if name.is_empty() {
        return Err(DesignError::InvalidValue {
            property: defn.name,
            reason: "user property name is blank".to_string(),
        });
    }
    if defn.kind.is_content() {
        return Err(DesignError::InvalidValue {
            property: name,
            reason: "user properties cannot hold content".to_string(),
        });
    }

    let kind = module.state.element(element)?.kind();
    let derived_defines = module
        .state
        .all_derived(element)
        .into_iter()
        .any(|d| module.state.get(d).is_some_and(|el| el.user_property(&name).is_some()));
    if name == "name"
        || name == EXTENDS_PROP
        || module.schema.property_defn(kind, &name).is_some()
        || module.user_property_defn(element, &name).is_some()
        || derived_defines
    {
        return Err(DesignError::DuplicateProperty {
            element,
            property: name,
        });
    }

    let defn = UserPropertyDefn::new(name, defn.kind);
    module.run_in_transaction("add user property", |m| {
        m.execute(Record::UserProperty {
            element,
            defn,
            action: Action::Add,
        })
    })
}

/// Drop a user property the element itself defines
///
/// Values set on the element and on its derived elements are cleared in the
/// same transaction.
///
/// # Errors
/// `PropertyNotFound` when the element does not define the property itself.
pub fn drop_user_property(module: &mut Module, element: ElementId, name: &str) -> Result<()> {
    module.logged("drop_user_property", Some(element), |m| undefine_user_property(m, element, name))
}

fn undefine_user_property(module: &mut Module, element: ElementId, name: &str) -> Result<()> {
    if module.state.element(element)?.user_property(name).is_none() {
        return Err(DesignError::PropertyNotFound {
            element,
            property: name.to_string(),
        });
    }
    module.run_in_transaction("drop user property", |m| drop_definition(m, element, name))
}

/// Clear every value of the definition, then remove it
///
/// Runs inside the caller's transaction.
pub(crate) fn drop_definition(m: &mut Module, element: ElementId, name: &str) -> Result<()> {
    let Some(defn) = m.state.element(element)?.user_property(name).cloned() else {
        return Ok(());
    };
    let mut holders = vec![element];
    holders.extend(m.state.all_derived(element));
    for holder in holders {
        change_property(m, holder, name, None)?;
    }
    m.execute(Record::UserProperty {
        element,
        defn,
        action: Action::Remove,
    })
}
