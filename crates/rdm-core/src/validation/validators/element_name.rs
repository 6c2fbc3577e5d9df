use crate::model::ElementId;
use crate::schema::{slots, ElementKind, NameOption};
use crate::validation::{names, SemanticError, SemanticErrorKind, SemanticValidator, ValidationContext};

/// Required names are present and names are unique in their name space
///
/// Styles held by a theme live outside the module style name space; they
/// only need to be unique among the theme's own styles.
pub struct ElementNameValidator;

impl ElementNameValidator {
    /// Check `new_name` for `element` before renaming it
    pub fn validate_for_rename(
        ctx: &ValidationContext<'_>,
        element: ElementId,
        new_name: Option<&str>,
    ) -> Vec<SemanticError> {
        check(ctx, element, new_name)
    }
}

impl SemanticValidator for ElementNameValidator {
    fn name(&self) -> &'static str {
        names::ELEMENT_NAME
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>, element: ElementId) -> Vec<SemanticError> {
        let name = ctx.state.get(element).and_then(|el| el.name());
        check(ctx, element, name)
    }
}

fn check(ctx: &ValidationContext<'_>, element: ElementId, name: Option<&str>) -> Vec<SemanticError> {
    let Some(el) = ctx.state.get(element) else {
        return Vec::new();
    };
    let kind = el.kind();
    let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
        if ctx.schema.name_option(kind) == NameOption::Required {
            return vec![SemanticError::new(
                SemanticErrorKind::NameRequired,
                element,
                names::ELEMENT_NAME,
                format!("{} must have a name", kind),
            )];
        }
        return Vec::new();
    };

    let holder = match theme_of(ctx, element) {
        Some(theme) => ctx
            .state
            .get(theme)
            .into_iter()
            .flat_map(|t| t.content(&slots::STYLES.into()).iter().copied())
            .find(|s| *s != element && ctx.state.get(*s).and_then(|e| e.name()) == Some(name)),
        None => ctx
            .schema
            .name_space(kind)
            .and_then(|space| ctx.state.name_spaces().lookup(space, name))
            .filter(|holder| *holder != element),
    };
    match holder {
        Some(holder) => vec![SemanticError::new(
            SemanticErrorKind::DuplicateName,
            element,
            names::ELEMENT_NAME,
            format!("name '{}' is already used by {}", name, holder),
        )],
        None => Vec::new(),
    }
}

/// Theme holding `element` when it is one of the theme's styles
fn theme_of(ctx: &ValidationContext<'_>, element: ElementId) -> Option<ElementId> {
    let el = ctx.state.get(element)?;
    if !ctx.schema.is_kind_of(el.kind(), ElementKind::Style) {
        return None;
    }
    let container = el.container_id()?;
    let kind = ctx.state.get(container)?.kind();
    ctx.schema
        .is_kind_of(kind, ElementKind::Theme)
        .then_some(container)
}
