use crate::model::{ElementId, PropertyValue};
use crate::validation::{names, SemanticError, SemanticErrorKind, SemanticValidator, ValidationContext};

const INCLUDED_STYLE_SHEETS: &str = "includedStyleSheets";

/// Every included style sheet must have been loaded
pub struct StyleSheetValidator;

impl SemanticValidator for StyleSheetValidator {
    fn name(&self) -> &'static str {
        names::STYLE_SHEET
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>, element: ElementId) -> Vec<SemanticError> {
        let Some(sheets) = ctx
            .state
            .get(element)
            .and_then(|el| el.local_property(INCLUDED_STYLE_SHEETS))
            .and_then(PropertyValue::as_list)
        else {
            return Vec::new();
        };
        sheets
            .iter()
            .filter(|sheet| !ctx.style_sheets.contains(sheet.as_str()))
            .map(|sheet| {
                SemanticError::new(
                    SemanticErrorKind::StyleSheetNotFound,
                    element,
                    names::STYLE_SHEET,
                    format!("style sheet '{}' is not loaded", sheet),
                )
                .with_property(INCLUDED_STYLE_SHEETS)
                .warning()
            })
            .collect()
    }
}
