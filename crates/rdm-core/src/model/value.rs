use serde::{Deserialize, Serialize};

use super::element::ElementId;

/// A reference from one element to another
///
/// References are stored by id once resolved. A reference read from a file
/// (or left behind when its target was removed with the `Unresolve` strategy)
/// carries the target name until a validator resolves it again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementRefValue {
    Resolved(ElementId),
    Unresolved(String),
}

impl ElementRefValue {
    pub fn resolved_id(&self) -> Option<ElementId> {
        match self {
            ElementRefValue::Resolved(id) => Some(*id),
            ElementRefValue::Unresolved(_) => None,
        }
    }

    pub fn unresolved_name(&self) -> Option<&str> {
        match self {
            ElementRefValue::Resolved(_) => None,
            ElementRefValue::Unresolved(name) => Some(name),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ElementRefValue::Resolved(_))
    }
}

/// Local value of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Expression(String),
    List(Vec<String>),
    ElementRef(ElementRefValue),
}

impl PropertyValue {
    pub fn string(value: impl Into<String>) -> Self {
        PropertyValue::String(value.into())
    }

    pub fn expression(value: impl Into<String>) -> Self {
        PropertyValue::Expression(value.into())
    }

    pub fn element(id: ElementId) -> Self {
        PropertyValue::ElementRef(ElementRefValue::Resolved(id))
    }

    pub fn element_name(name: impl Into<String>) -> Self {
        PropertyValue::ElementRef(ElementRefValue::Unresolved(name.into()))
    }

    /// Blank values count as "not set" for required-property checks
    pub fn is_blank(&self) -> bool {
        match self {
            PropertyValue::String(s) | PropertyValue::Expression(s) => s.trim().is_empty(),
            PropertyValue::List(items) => items.is_empty(),
            PropertyValue::ElementRef(ElementRefValue::Unresolved(name)) => name.trim().is_empty(),
            PropertyValue::Integer(_)
            | PropertyValue::Boolean(_)
            | PropertyValue::ElementRef(ElementRefValue::Resolved(_)) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Expression(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_element_ref(&self) -> Option<&ElementRefValue> {
        match self {
            PropertyValue::ElementRef(r) => Some(r),
            _ => None,
        }
    }

    /// Short type tag used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Expression(_) => "expression",
            PropertyValue::List(_) => "list",
            PropertyValue::ElementRef(_) => "element-ref",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(PropertyValue::string("  ").is_blank());
        assert!(PropertyValue::expression("").is_blank());
        assert!(PropertyValue::List(vec![]).is_blank());
        assert!(!PropertyValue::Integer(0).is_blank());
        assert!(!PropertyValue::element(ElementId::new(3)).is_blank());
        assert!(!PropertyValue::element_name("ds").is_blank());
    }

    #[test]
    fn test_ref_accessors() {
        let resolved = ElementRefValue::Resolved(ElementId::new(7));
        assert_eq!(resolved.resolved_id(), Some(ElementId::new(7)));
        assert!(resolved.unresolved_name().is_none());

        let unresolved = ElementRefValue::Unresolved("s1".to_string());
        assert_eq!(unresolved.unresolved_name(), Some("s1"));
        assert!(!unresolved.is_resolved());
    }
}
