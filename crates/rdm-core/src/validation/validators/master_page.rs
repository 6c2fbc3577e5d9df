use crate::model::{ElementId, PropertyValue};
use crate::schema::{slots, ElementKind};
use crate::validation::{names, SemanticError, SemanticErrorKind, SemanticValidator, ValidationContext};

const CUSTOM_PAGE: &str = "custom";

/// A custom page type needs a positive width and height
pub struct MasterPageSizeValidator;

impl SemanticValidator for MasterPageSizeValidator {
    fn name(&self) -> &'static str {
        names::MASTER_PAGE_SIZE
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>, element: ElementId) -> Vec<SemanticError> {
        let Some(page) = ctx.state.get(element) else {
            return Vec::new();
        };
        if page.local_property("type").and_then(PropertyValue::as_str) != Some(CUSTOM_PAGE) {
            return Vec::new();
        }
        ["width", "height"]
            .into_iter()
            .filter(|prop| {
                page.local_property(prop)
                    .and_then(PropertyValue::as_integer)
                    .map_or(true, |v| v <= 0)
            })
            .map(|prop| {
                SemanticError::new(
                    SemanticErrorKind::InvalidPageSize,
                    element,
                    names::MASTER_PAGE_SIZE,
                    format!("custom page size needs a positive {}", prop),
                )
                .with_property(prop)
            })
            .collect()
    }
}

/// A report design holds at least one master page
pub struct MasterPageRequiredValidator;

impl SemanticValidator for MasterPageRequiredValidator {
    fn name(&self) -> &'static str {
        names::MASTER_PAGE_REQUIRED
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>, element: ElementId) -> Vec<SemanticError> {
        let Some(el) = ctx.state.get(element) else {
            return Vec::new();
        };
        if el.kind() != ElementKind::ReportDesign || !el.content(&slots::PAGES.into()).is_empty() {
            return Vec::new();
        }
        vec![SemanticError::new(
            SemanticErrorKind::MissingMasterPage,
            element,
            names::MASTER_PAGE_REQUIRED,
            "report design has no master page",
        )]
    }
}
