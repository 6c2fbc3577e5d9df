use crate::model::{ElementId, ElementRefValue, PropertyValue, EXTENDS_PROP};
use crate::schema::ElementKind;
use crate::validation::{names, SemanticError, SemanticErrorKind, SemanticValidator, ValidationContext};

/// Reference properties and `extends` point at live elements of the right kind
///
/// A name reference that can now be found is not an error: the validator
/// asks for it to be resolved and the executor caches the link.
pub struct ElementReferenceValidator;

impl SemanticValidator for ElementReferenceValidator {
    fn name(&self) -> &'static str {
        names::ELEMENT_REFERENCE
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>, element: ElementId) -> Vec<SemanticError> {
        let state = ctx.state;
        let schema = ctx.schema;
        let Some(el) = state.get(element) else {
            return Vec::new();
        };

        let mut errors = Vec::new();
        for defn in schema.properties(el.kind()) {
            let Some(target_kind) = defn.kind.reference_target() else {
                continue;
            };
            let Some(value) = el.local_property(&defn.name).and_then(PropertyValue::as_element_ref)
            else {
                continue;
            };
            errors.extend(check_reference(ctx, element, &defn.name, value, target_kind));
        }
        if let Some(value) = el.extends() {
            errors.extend(check_reference(ctx, element, EXTENDS_PROP, value, el.kind()));
        }
        errors
    }
}

fn check_reference(
    ctx: &mut ValidationContext<'_>,
    element: ElementId,
    property: &str,
    value: &ElementRefValue,
    expected: ElementKind,
) -> Option<SemanticError> {
    let state = ctx.state;
    let schema = ctx.schema;
    let acceptable = |target: ElementId| {
        state.is_live(target)
            && state
                .get(target)
                .is_some_and(|t| schema.is_kind_of(t.kind(), expected))
    };

    let lookup = |name: &str| {
        schema
            .name_space(expected)
            .and_then(|space| state.name_spaces().lookup(space, name))
            .filter(|target| acceptable(*target))
    };

    let described = match value {
        ElementRefValue::Resolved(target) => {
            if acceptable(*target) {
                return None;
            }
            // A target that left the design is looked up again by its name
            let detached_name = state
                .get(*target)
                .filter(|_| !state.is_live(*target))
                .and_then(|t| t.name());
            match detached_name {
                Some(name) => {
                    if let Some(found) = lookup(name) {
                        ctx.resolve_later(element, property, found);
                        return None;
                    }
                    ctx.unresolve_later(element, property, name);
                    format!("'{}'", name)
                }
                None => target.to_string(),
            }
        }
        ElementRefValue::Unresolved(name) => {
            if let Some(target) = lookup(name) {
                ctx.resolve_later(element, property, target);
                return None;
            }
            format!("'{}'", name)
        }
    };
    Some(
        SemanticError::new(
            SemanticErrorKind::UnresolvedReference,
            element,
            names::ELEMENT_REFERENCE,
            format!("{} {} does not refer to a {}", property, described, expected),
        )
        .with_property(property),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{DesignState, STYLE_PROP};
    use crate::schema::{slots, NameSpaceKind, Schema};
    use crate::validation::Resolution;

    fn style(state: &mut DesignState, name: &str, live: bool) -> ElementId {
        let id = state.allocate(ElementKind::Style);
        state.put_name(id, Some(name.to_string())).unwrap();
        if live {
            let root = state.root();
            state.attach(root, &slots::STYLES.into(), id, 0).unwrap();
            state.name_space_insert(NameSpaceKind::Style, name, id).unwrap();
        }
        id
    }

    fn label_styled_by(state: &mut DesignState, target: ElementId) -> ElementId {
        let root = state.root();
        let label = state.allocate(ElementKind::Label);
        state.attach(root, &slots::BODY.into(), label, 0).unwrap();
        state
            .put_property(label, STYLE_PROP, Some(PropertyValue::element(target)))
            .unwrap();
        label
    }

    fn check(state: &DesignState, label: ElementId) -> (Vec<SemanticError>, Vec<Resolution>) {
        let schema = Schema::report_design();
        let sheets = BTreeSet::new();
        let mut ctx = ValidationContext::new(state, &schema, &sheets);
        let errors = ElementReferenceValidator.validate(&mut ctx, label);
        (errors, ctx.into_resolutions())
    }

    #[test]
    fn test_detached_target_falls_back_to_its_name() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let gone = style(&mut state, "s1", false);
        let label = label_styled_by(&mut state, gone);

        let (errors, resolutions) = check(&state, label);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'s1'"));
        assert_eq!(resolutions.len(), 1);
        assert_eq!(resolutions[0].value, ElementRefValue::Unresolved("s1".to_string()));
    }

    #[test]
    fn test_detached_target_moves_to_live_namesake() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let gone = style(&mut state, "s1", false);
        let fresh = style(&mut state, "s1", true);
        let label = label_styled_by(&mut state, gone);

        let (errors, resolutions) = check(&state, label);

        assert!(errors.is_empty());
        assert_eq!(resolutions[0].value, ElementRefValue::Resolved(fresh));
    }

    #[test]
    fn test_live_target_of_wrong_kind_keeps_its_id() {
        let mut state = DesignState::new(ElementKind::ReportDesign, true);
        let root = state.root();
        let other = state.allocate(ElementKind::Label);
        state.put_name(other, Some("s1".to_string())).unwrap();
        state.attach(root, &slots::BODY.into(), other, 0).unwrap();
        let label = label_styled_by(&mut state, other);

        let (errors, resolutions) = check(&state, label);

        assert_eq!(errors.len(), 1);
        assert!(resolutions.is_empty());
    }
}
