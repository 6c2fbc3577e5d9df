//! Post-commit semantic validation
//!
//! Validation is advisory: validators report [`SemanticError`] values that
//! the module stores per element, and nothing is ever rolled back because of
//! them. Which validators run after a change is decided by the schema's
//! trigger definitions (see [`executor`]).

pub mod executor;
pub mod validators;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use crate::errors::{DesignError, Result};
use crate::model::{DesignState, ElementId, ElementRefValue};
use crate::schema::Schema;

/// Names under which the built-in validators are registered
pub mod names {
    pub const ELEMENT_NAME: &str = "element_name";
    pub const ELEMENT_REFERENCE: &str = "element_reference";
    pub const REQUIRED_PROPERTY: &str = "required_property";
    pub const GROUP_NAME: &str = "group_name";
    pub const STYLE_SHEET: &str = "style_sheet";
    pub const MASTER_PAGE_SIZE: &str = "master_page_size";
    pub const MASTER_PAGE_REQUIRED: &str = "master_page_required";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticErrorKind {
    DuplicateGroupName,
    MissingRequiredProperty,
    StyleSheetNotFound,
    InvalidPageSize,
    UnresolvedReference,
    DuplicateName,
    NameRequired,
    MissingMasterPage,
}

impl SemanticErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            SemanticErrorKind::DuplicateGroupName => "DUPLICATE_GROUP_NAME",
            SemanticErrorKind::MissingRequiredProperty => "MISSING_REQUIRED_PROPERTY",
            SemanticErrorKind::StyleSheetNotFound => "STYLE_SHEET_NOT_FOUND",
            SemanticErrorKind::InvalidPageSize => "INVALID_PAGE_SIZE",
            SemanticErrorKind::UnresolvedReference => "UNRESOLVED_REFERENCE",
            SemanticErrorKind::DuplicateName => "DUPLICATE_NAME",
            SemanticErrorKind::NameRequired => "NAME_REQUIRED",
            SemanticErrorKind::MissingMasterPage => "MISSING_MASTER_PAGE",
        }
    }
}

/// One finding of a validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    /// Element the finding is about
    pub element: ElementId,
    pub validator: String,
    pub property: Option<String>,
    pub message: String,
    pub severity: Severity,
}

impl SemanticError {
    pub fn new(
        kind: SemanticErrorKind,
        element: ElementId,
        validator: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            element,
            validator: validator.to_string(),
            property: None,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.code(), self.element, self.message)
    }
}

/// A reference value a validator wants cached on the referrer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub referrer: ElementId,
    pub property: String,
    pub value: ElementRefValue,
}

/// Read-only view handed to validators
///
/// Validators never mutate the design. Resolutions they discover, and
/// links to elements that left the design, are collected here and cached by
/// the executor afterwards, outside the undo history.
pub struct ValidationContext<'a> {
    pub state: &'a DesignState,
    pub schema: &'a Schema,
    pub style_sheets: &'a BTreeSet<String>,
    resolutions: Vec<Resolution>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        state: &'a DesignState,
        schema: &'a Schema,
        style_sheets: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            state,
            schema,
            style_sheets,
            resolutions: Vec::new(),
        }
    }

    pub fn resolve_later(&mut self, referrer: ElementId, property: &str, target: ElementId) {
        self.resolutions.push(Resolution {
            referrer,
            property: property.to_string(),
            value: ElementRefValue::Resolved(target),
        });
    }

    /// Fall back to the name once the resolved target is gone
    pub fn unresolve_later(&mut self, referrer: ElementId, property: &str, name: &str) {
        self.resolutions.push(Resolution {
            referrer,
            property: property.to_string(),
            value: ElementRefValue::Unresolved(name.to_string()),
        });
    }

    pub(crate) fn into_resolutions(self) -> Vec<Resolution> {
        self.resolutions
    }
}

/// A stateless check run against one element
pub trait SemanticValidator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Element the validator's findings are stored under when triggered for
    /// `element`; `None` skips the run
    fn scope(&self, _ctx: &ValidationContext<'_>, element: ElementId) -> Option<ElementId> {
        Some(element)
    }

    fn validate(&self, ctx: &mut ValidationContext<'_>, element: ElementId) -> Vec<SemanticError>;
}

/// Validators by registration name
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: BTreeMap<String, Arc<dyn SemanticValidator>>,
}

impl ValidatorRegistry {
    /// Registry of every built-in validator
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(validators::ElementNameValidator));
        registry.register(Arc::new(validators::ElementReferenceValidator));
        registry.register(Arc::new(validators::RequiredPropertyValidator));
        registry.register(Arc::new(validators::GroupNameValidator));
        registry.register(Arc::new(validators::StyleSheetValidator));
        registry.register(Arc::new(validators::MasterPageSizeValidator));
        registry.register(Arc::new(validators::MasterPageRequiredValidator));
        registry
    }

    pub fn register(&mut self, validator: Arc<dyn SemanticValidator>) {
        self.validators
            .insert(validator.name().to_string(), validator);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn SemanticValidator>> {
        self.validators.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns `UnknownValidator` for the first validator the schema names
    /// that is not registered.
    pub fn check_covers(&self, schema: &Schema) -> Result<()> {
        match schema
            .validator_names()
            .into_iter()
            .find(|name| !self.validators.contains_key(*name))
        {
            Some(name) => Err(DesignError::UnknownValidator {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.validators.keys()).finish()
    }
}
