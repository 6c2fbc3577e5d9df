//! Structural loading of a design
//!
//! A [`DesignBuilder`] wraps every build call in one silent transaction: no
//! notifications, no validation, and containment is lenient about names so
//! a document with duplicate or missing names still loads. [`finish`]
//! commits, clears the history, marks the design saved and runs the full
//! semantic check, which reports what the lenient load let through.
//!
//! [`finish`]: DesignBuilder::finish

pub mod script;

pub use script::{DesignScript, ScriptElement, ScriptValue};

use crate::activity::TransOptions;
use crate::errors::{DesignError, Result};
use crate::model::{ContentLocation, ElementId, PropertyValue, UserPropertyDefn};
use crate::module::Module;
use crate::ops::{content_ops, extends_ops, name_ops, property_ops, user_property_ops};
use crate::schema::ElementKind;

pub struct DesignBuilder {
    module: Module,
}

impl DesignBuilder {
    pub fn new(mut module: Module) -> Self {
        module.start_trans_with("load design", TransOptions::silent());
        Self { module }
    }

    /// # Errors
    ///
    /// See [`Module::report_design`].
    pub fn report_design() -> Result<Self> {
        Ok(Self::new(Module::report_design()?))
    }

    /// # Errors
    ///
    /// See [`Module::library`].
    pub fn library() -> Result<Self> {
        Ok(Self::new(Module::library()?))
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn root(&self) -> ElementId {
        self.module.root()
    }

    /// Create a detached element, optionally named
    ///
    /// # Errors
    /// `AbstractElement`, `InvalidSchema` or `NameForbidden`.
    pub fn create(&mut self, kind: ElementKind, name: Option<&str>) -> Result<ElementId> {
        let id = self.module.create_element(kind)?;
        if name.is_some() {
            name_ops::set_name(&mut self.module, id, name)?;
        }
        Ok(id)
    }

    /// Append `content` to `location` of `container`
    ///
    /// Missing names and names already taken are left for the semantic
    /// check; every structural rule still applies.
    ///
    /// # Errors
    /// The containment errors of [`content_ops::add`].
    pub fn add(&mut self, container: ElementId, content: ElementId, location: ContentLocation) -> Result<()> {
        content_ops::add_with(&mut self.module, container, content, location, None, true)
    }

    /// Append `content` to the slot or content property named `slot`
    ///
    /// # Errors
    /// `SlotNotFound` when the container kind has no such content location,
    /// plus the errors of [`DesignBuilder::add`].
    pub fn add_to(&mut self, container: ElementId, slot: &str, content: ElementId) -> Result<()> {
        let kind = self.module.element(container)?.kind();
        let location = self
            .module
            .schema()
            .location_by_name(kind, slot)
            .ok_or_else(|| DesignError::SlotNotFound {
                element: container,
                location: ContentLocation::property(slot),
            })?;
        self.add(container, content, location)
    }

    /// # Errors
    /// See [`property_ops::set_property`].
    pub fn set_property(&mut self, element: ElementId, property: &str, value: PropertyValue) -> Result<()> {
        property_ops::set_property(&mut self.module, element, property, Some(value))
    }

    /// Record the parent by name; it is resolved by the semantic check
    ///
    /// # Errors
    /// `ExtendsForbidden` for kinds that cannot extend.
    pub fn set_extends_name(&mut self, element: ElementId, name: &str) -> Result<()> {
        extends_ops::put_extends_name(&mut self.module, element, name)
    }

    /// # Errors
    /// See [`user_property_ops::add_user_property`].
    pub fn add_user_property(&mut self, element: ElementId, defn: UserPropertyDefn) -> Result<()> {
        user_property_ops::add_user_property(&mut self.module, element, defn)
    }

    pub fn load_style_sheet(&mut self, name: impl Into<String>) {
        self.module.load_style_sheet(name);
    }

    /// Close the load and check the result
    ///
    /// The returned module has an empty history, is not dirty, and holds the
    /// semantic errors of the whole design.
    ///
    /// # Errors
    /// `NoTransaction` if the load transaction was closed from outside.
    pub fn finish(mut self) -> Result<Module> {
        self.module.commit()?;
        self.module.flush_history();
        self.module.mark_saved();
        let errors = self.module.semantic_check();
        tracing::debug!(
            elements = self.module.state().live_elements().len(),
            errors = errors.len(),
            "design loaded"
        );
        Ok(self.module)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::slots;
    use crate::validation::SemanticErrorKind;

    #[test]
    fn test_duplicate_names_load_and_are_reported() {
        let mut builder = DesignBuilder::report_design().unwrap();
        let root = builder.root();
        let page = builder.create(ElementKind::SimpleMasterPage, Some("page")).unwrap();
        builder.add_to(root, "pages", page).unwrap();
        let first = builder.create(ElementKind::Style, Some("s")).unwrap();
        builder.add(root, first, slots::STYLES.into()).unwrap();
        let second = builder.create(ElementKind::Style, Some("s")).unwrap();
        builder.add(root, second, slots::STYLES.into()).unwrap();

        let module = builder.finish().unwrap();
        assert!(!module.is_dirty());
        assert!(!module.stack().can_undo());
        assert_eq!(module.find_style("s"), Some(first));
        let errors = module.errors_of(second);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, SemanticErrorKind::DuplicateName);
    }

    #[test]
    fn test_extends_by_name_resolves_at_finish() {
        let mut builder = DesignBuilder::library().unwrap();
        let root = builder.root();
        let child = builder.create(ElementKind::Label, Some("child")).unwrap();
        builder.set_extends_name(child, "base").unwrap();
        let base = builder.create(ElementKind::Label, Some("base")).unwrap();
        builder.add_to(root, "components", base).unwrap();
        builder.add_to(root, "components", child).unwrap();

        let module = builder.finish().unwrap();
        assert_eq!(module.element(child).unwrap().extends_id(), Some(base));
        assert_eq!(module.state().derived_elements(base), vec![child]);
        assert!(module.all_errors().is_empty());
    }

    #[test]
    fn test_structural_rules_still_apply() {
        let mut builder = DesignBuilder::report_design().unwrap();
        let root = builder.root();
        let label = builder.create(ElementKind::Label, None).unwrap();
        let err = builder.add_to(root, "styles", label).unwrap_err();
        assert!(matches!(err, DesignError::WrongType { .. }));
        let err = builder.add_to(root, "nowhere", label).unwrap_err();
        assert!(matches!(err, DesignError::SlotNotFound { .. }));
    }
}
