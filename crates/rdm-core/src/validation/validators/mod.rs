//! Built-in validators

mod element_name;
mod element_reference;
mod group_name;
mod master_page;
mod required_property;
mod style_sheet;

pub use element_name::ElementNameValidator;
pub use element_reference::ElementReferenceValidator;
pub use group_name::GroupNameValidator;
pub use master_page::{MasterPageRequiredValidator, MasterPageSizeValidator};
pub use required_property::RequiredPropertyValidator;
pub use style_sheet::StyleSheetValidator;

use crate::model::{DesignState, ElementId, PropertyValue};

/// Value of `name` on `element` or the nearest element of its extends chain
pub(crate) fn inherited_value<'s>(
    state: &'s DesignState,
    element: ElementId,
    name: &str,
) -> Option<&'s PropertyValue> {
    std::iter::once(element)
        .chain(state.extends_chain(element))
        .filter_map(|id| state.get(id))
        .find_map(|el| el.local_property(name))
}

pub(crate) fn is_set(state: &DesignState, element: ElementId, name: &str) -> bool {
    inherited_value(state, element, name).is_some_and(|v| !v.is_blank())
}
