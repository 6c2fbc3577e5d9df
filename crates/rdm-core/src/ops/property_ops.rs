use super::change_property;
use crate::errors::{DesignError, Result};
use crate::model::{ElementId, ElementRefValue, PropertyValue, EXTENDS_PROP, STYLE_PROP};
use crate::module::Module;
use crate::schema::{ElementKind, PropertyKind};

/// Property names handled by their own commands
const RESERVED: [&str; 2] = ["name", EXTENDS_PROP];

/// Set or clear (`None`) a local property value
///
/// Element references given by name resolve immediately when a live
/// element of the target kind holds that name; otherwise the name is kept
/// and left to validation.
///
/// # Errors
/// * `ReservedProperty` - `name` or `extends`
/// * `PropertyNotFound` - Neither the schema nor a user property defines it
/// * `InvalidValue` - Value does not fit the property type, or the property
///   is a content list
/// * `WrongElementType` - Referenced element has the wrong kind
/// * `UnresolvedReference` - A live element referring to an element that is
///   not part of the design
pub fn set_property(
    module: &mut Module,
    element: ElementId,
    property: &str,
    value: Option<PropertyValue>,
) -> Result<()> {
    module.logged("set_property", Some(element), |m| {
        write_property(m, element, property, value)
    })
}

fn write_property(
    module: &mut Module,
    element: ElementId,
    property: &str,
    value: Option<PropertyValue>,
) -> Result<()> {
    if RESERVED.contains(&property) {
        return Err(DesignError::ReservedProperty {
            property: property.to_string(),
        });
    }
    let kind = module.property_kind(element, property)?;
    let value = match value {
        Some(value) => Some(check_value(module, element, property, &kind, value)?),
        None => None,
    };
    if module.state.element(element)?.local_property(property) == value.as_ref() {
        return Ok(());
    }
    module.run_in_transaction("set property", |m| {
        change_property(m, element, property, value)
    })?;
    tracing::debug!(%element, property, "property set");
    Ok(())
}

fn invalid(property: &str, reason: impl Into<String>) -> DesignError {
    DesignError::InvalidValue {
        property: property.to_string(),
        reason: reason.into(),
    }
}

fn check_value(
    module: &Module,
    element: ElementId,
    property: &str,
    kind: &PropertyKind,
    value: PropertyValue,
) -> Result<PropertyValue> {
    let mismatch = |value: &PropertyValue| {
        invalid(
            property,
            format!("a {} value does not fit this property", value.type_name()),
        )
    };
    match (kind, value) {
        (PropertyKind::ContentList { .. }, _) => Err(invalid(
            property,
            "content lists change through content commands",
        )),
        (PropertyKind::String, v @ PropertyValue::String(_))
        | (PropertyKind::Integer, v @ PropertyValue::Integer(_))
        | (PropertyKind::Boolean, v @ PropertyValue::Boolean(_))
        | (PropertyKind::Expression, v @ PropertyValue::Expression(_))
        | (PropertyKind::StringList, v @ PropertyValue::List(_)) => Ok(v),
        (PropertyKind::Expression, PropertyValue::String(s)) => Ok(PropertyValue::Expression(s)),
        (PropertyKind::Choice { choices }, PropertyValue::String(s)) => {
            if choices.iter().any(|c| *c == s) {
                Ok(PropertyValue::String(s))
            } else {
                Err(invalid(
                    property,
                    format!("'{}' is not one of {}", s, choices.join(", ")),
                ))
            }
        }
        (PropertyKind::ElementRef { target }, PropertyValue::ElementRef(reference)) => {
            check_reference(module, element, property, *target, reference)
                .map(PropertyValue::ElementRef)
        }
        (_, other) => Err(mismatch(&other)),
    }
}

fn check_reference(
    module: &Module,
    element: ElementId,
    property: &str,
    expected: ElementKind,
    reference: ElementRefValue,
) -> Result<ElementRefValue> {
    match reference {
        ElementRefValue::Resolved(target) => {
            let actual = module.state.element(target)?.kind();
            if !module.schema.is_kind_of(actual, expected) {
                return Err(DesignError::WrongElementType {
                    property: property.to_string(),
                    expected,
                    actual,
                });
            }
            if module.state.is_live(element) && !module.state.is_live(target) {
                return Err(DesignError::UnresolvedReference {
                    element,
                    property: property.to_string(),
                    target: target.to_string(),
                });
            }
            Ok(ElementRefValue::Resolved(target))
        }
        ElementRefValue::Unresolved(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(invalid(property, "reference name is blank"));
            }
            let found = module
                .schema
                .name_space(expected)
                .and_then(|space| module.state.name_spaces().lookup(space, &name))
                .filter(|target| {
                    module
                        .state
                        .get(*target)
                        .is_some_and(|t| module.schema.is_kind_of(t.kind(), expected))
                });
            Ok(match found {
                Some(target) => ElementRefValue::Resolved(target),
                None => ElementRefValue::Unresolved(name),
            })
        }
    }
}

/// Set or clear the style of an element
///
/// # Errors
/// See [`set_property`]; `PropertyNotFound` for kinds without a style.
pub fn set_style(module: &mut Module, element: ElementId, style: Option<ElementId>) -> Result<()> {
    module.logged("set_style", Some(element), |m| {
        write_property(m, element, STYLE_PROP, style.map(PropertyValue::element))
    })
}

/// Set the style of an element by style name
pub fn set_style_name(module: &mut Module, element: ElementId, name: &str) -> Result<()> {
    module.logged("set_style", Some(element), |m| {
        write_property(m, element, STYLE_PROP, Some(PropertyValue::element_name(name)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{content_ops, name_ops};
    use crate::schema::slots;

    fn design_with_label() -> (Module, ElementId) {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let label = module.create_element(ElementKind::Label).unwrap();
        content_ops::add(&mut module, root, label, slots::BODY.into(), None).unwrap();
        (module, label)
    }

    #[test]
    fn test_type_checks() {
        let (mut module, label) = design_with_label();
        let err = set_property(&mut module, label, "width", Some(PropertyValue::Boolean(true)))
            .unwrap_err();
        assert!(matches!(err, DesignError::InvalidValue { .. }));

        let err = set_property(&mut module, label, "name", None).unwrap_err();
        assert!(matches!(err, DesignError::ReservedProperty { .. }));

        let err = set_property(&mut module, label, "nope", None).unwrap_err();
        assert!(matches!(err, DesignError::PropertyNotFound { .. }));

        let err = set_property(
            &mut module,
            label,
            "textAlign",
            Some(PropertyValue::string("diagonal")),
        )
        .unwrap_err();
        assert!(matches!(err, DesignError::InvalidValue { .. }));
    }

    #[test]
    fn test_unchanged_value_records_nothing() {
        let (mut module, label) = design_with_label();
        set_property(&mut module, label, "text", Some(PropertyValue::string("hi"))).unwrap();
        let depth = module.stack().undo_depth();
        set_property(&mut module, label, "text", Some(PropertyValue::string("hi"))).unwrap();
        assert_eq!(module.stack().undo_depth(), depth);
    }

    #[test]
    fn test_style_by_name_resolves_when_present() {
        let (mut module, label) = design_with_label();
        set_style_name(&mut module, label, "later").unwrap();
        assert_eq!(
            module.element(label).unwrap().local_property(STYLE_PROP),
            Some(&PropertyValue::element_name("later"))
        );

        let root = module.root();
        let style = module.create_element(ElementKind::Style).unwrap();
        name_ops::set_name(&mut module, style, Some("s1")).unwrap();
        content_ops::add(&mut module, root, style, slots::STYLES.into(), None).unwrap();
        set_style_name(&mut module, label, "s1").unwrap();
        assert_eq!(
            module.element(label).unwrap().local_property(STYLE_PROP),
            Some(&PropertyValue::element(style))
        );
        assert_eq!(module.state().clients(style).len(), 1);
    }

    #[test]
    fn test_reference_kind_is_checked() {
        let (mut module, label) = design_with_label();
        let root = module.root();
        let other = module.create_element(ElementKind::Label).unwrap();
        content_ops::add(&mut module, root, other, slots::BODY.into(), None).unwrap();
        let err = set_style(&mut module, label, Some(other)).unwrap_err();
        assert!(matches!(err, DesignError::WrongElementType { .. }));

        let detached = module.create_element(ElementKind::Style).unwrap();
        let err = set_style(&mut module, label, Some(detached)).unwrap_err();
        assert!(matches!(err, DesignError::UnresolvedReference { .. }));
    }
}
