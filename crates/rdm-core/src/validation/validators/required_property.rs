use super::is_set;
use crate::model::ElementId;
use crate::validation::{names, SemanticError, SemanticErrorKind, SemanticValidator, ValidationContext};

/// Required properties and companion rules
///
/// Values inherited through `extends` count as set. A companion rule makes
/// a property required as soon as any property it depends on is set, for
/// example a parameter's label expression needs the data set name.
pub struct RequiredPropertyValidator;

impl SemanticValidator for RequiredPropertyValidator {
    fn name(&self) -> &'static str {
        names::REQUIRED_PROPERTY
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>, element: ElementId) -> Vec<SemanticError> {
        let Some(el) = ctx.state.get(element) else {
            return Vec::new();
        };
        let kind = el.kind();
        let mut errors = Vec::new();

        for defn in ctx.schema.properties(kind) {
            let has_default = defn.default.as_ref().is_some_and(|v| !v.is_blank());
            if defn.required && !has_default && !is_set(ctx.state, element, &defn.name) {
                errors.push(missing(element, &defn.name, format!("{} is required", defn.name)));
            }
        }

        for rule in ctx.schema.companions(kind) {
            let Some(trigger) = rule
                .when_any_set
                .iter()
                .find(|p| is_set(ctx.state, element, p))
            else {
                continue;
            };
            if !is_set(ctx.state, element, &rule.required) {
                errors.push(missing(
                    element,
                    &rule.required,
                    format!("{} is required when {} is set", rule.required, trigger),
                ));
            }
        }
        errors
    }
}

fn missing(element: ElementId, property: &str, message: String) -> SemanticError {
    SemanticError::new(
        SemanticErrorKind::MissingRequiredProperty,
        element,
        names::REQUIRED_PROPERTY,
        message,
    )
    .with_property(property)
}
