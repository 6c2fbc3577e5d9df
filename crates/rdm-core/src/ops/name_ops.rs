use super::content_ops::check_theme_style_name;
use super::{is_theme_style, name_space_of};
use crate::activity::{Action, Record};
use crate::errors::{DesignError, Result};
use crate::model::ElementId;
use crate::module::Module;
use crate::schema::NameOption;

fn normalize(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Rename an element, or clear its name with `None`
///
/// Names are trimmed; a blank name clears. A live element moves between
/// name-space entries in the same transaction.
///
/// # Errors
/// * `NameForbidden` - Kind takes no name
/// * `NameRequired` - Clearing the name of a kind that requires one
/// * `HasReferences` - Clearing the name while other elements refer to it
/// * `DuplicateName` - Another live element holds the name in the same
///   name space (or the same theme, for theme styles)
pub fn set_name(module: &mut Module, element: ElementId, name: Option<&str>) -> Result<()> {
    module.logged("set_name", Some(element), |m| rename(m, element, name))
}

fn rename(module: &mut Module, element: ElementId, name: Option<&str>) -> Result<()> {
    let new = normalize(name);
    let el = module.state.element(element)?;
    let old = el.name().map(str::to_string);
    if old == new {
        return Ok(());
    }

    let kind = el.kind();
    let holder = el.container_id();
    match (&new, module.schema.name_option(kind)) {
        (Some(_), NameOption::Forbidden) => return Err(DesignError::NameForbidden { element }),
        (None, NameOption::Required) => return Err(DesignError::NameRequired { element }),
        (None, _) if !module.state.clients(element).is_empty() => {
            return Err(DesignError::HasReferences { element })
        }
        _ => {}
    }

    let live = module.state.is_live(element);
    let space = name_space_of(module, element, holder);
    if let Some(name) = &new {
        if is_theme_style(module, kind, holder) {
            if let Some(theme) = holder {
                check_theme_style_name(module, theme, element, name)?;
            }
        } else if let Some(space) = space.filter(|_| live) {
            if module
                .state
                .name_spaces()
                .lookup(space, name)
                .is_some_and(|h| h != element)
            {
                return Err(DesignError::DuplicateName {
                    name: name.clone(),
                    scope: space.to_string(),
                });
            }
        }
    }

    let module_root = module.state.root();
    module.run_in_transaction("rename", |m| {
        if let (Some(space), Some(old), true) = (space, &old, live) {
            if m.state.name_spaces().lookup(space, old) == Some(element) {
                m.execute(Record::NameSpace {
                    space,
                    name: old.clone(),
                    element,
                    action: Action::Remove,
                    module: module_root,
                })?;
            }
        }
        m.execute(Record::Name {
            element,
            old: old.clone(),
            new: new.clone(),
        })?;
        if let (Some(space), Some(new), true) = (space, &new, live) {
            m.execute(Record::NameSpace {
                space,
                name: new.clone(),
                element,
                action: Action::Add,
                module: module_root,
            })?;
        }
        Ok(())
    })
}

/// Give an element a name no other element of its name space uses
///
/// Keeps the current name when it is already unique. Otherwise tries the
/// current name (or the kind's prefix) followed by 1, 2, ... and renames
/// the element to the first free candidate.
///
/// # Returns
/// The element's name afterwards
pub fn make_unique_name(module: &mut Module, element: ElementId) -> Result<String> {
    module.logged("make_unique_name", Some(element), |m| pick_unique_name(m, element))
}

fn pick_unique_name(module: &mut Module, element: ElementId) -> Result<String> {
    let el = module.state.element(element)?;
    if module.schema.name_option(el.kind()) == NameOption::Forbidden {
        return Err(DesignError::NameForbidden { element });
    }
    let current = el.name().map(str::to_string);
    let base = current
        .clone()
        .unwrap_or_else(|| el.kind().name_prefix().to_string());

    let candidates = current
        .iter()
        .cloned()
        .chain((1u64..).map(|n| format!("{}{}", base, n)));
    for candidate in candidates {
        if is_free(module, element, &candidate) {
            if current.as_deref() != Some(candidate.as_str()) {
                set_name(module, element, Some(&candidate))?;
            }
            return Ok(candidate);
        }
    }
    Err(DesignError::Internal {
        message: "name candidates exhausted".to_string(),
    })
}

fn is_free(module: &Module, element: ElementId, name: &str) -> bool {
    let Some(el) = module.state.get(element) else {
        return false;
    };
    let holder = el.container_id();
    if is_theme_style(module, el.kind(), holder) {
        return holder
            .map_or(true, |theme| check_theme_style_name(module, theme, element, name).is_ok());
    }
    match module.schema.name_space(el.kind()) {
        Some(space) => module
            .state
            .name_spaces()
            .lookup(space, name)
            .map_or(true, |h| h == element),
        None => true,
    }
}
