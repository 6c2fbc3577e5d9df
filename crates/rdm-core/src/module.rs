//! The module: root of one design and owner of its bookkeeping
//!
//! A [`Module`] owns the design state (arena, name spaces, back references),
//! the activity stack that mutates it, the listener registry and the stored
//! semantic errors. The schema and validator registry are shared, read-only
//! context passed in at construction.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use crate::activity::{
    ActivityStack, ActivityStackListener, CommitOutcome, DesignListener, ListenerId,
    ListenerRegistry, ListenerScope, Record, Settled, TransOptions,
};
use crate::config::DesignConfig;
use crate::digest::state_digest;
use crate::errors::{DesignError, Result};
use crate::model::{
    DesignElement, DesignState, ElementId, ElementRefValue, PropertyValue, UserPropertyDefn,
    STYLE_PROP,
};
use crate::schema::{ElementKind, NameSpaceKind, PropertyKind, Schema};
use crate::validation::{executor, SemanticError, ValidatorRegistry};
use crate::{log_op_end, log_op_error, log_op_start};

pub struct Module {
    pub(crate) schema: Arc<Schema>,
    pub(crate) validators: Arc<ValidatorRegistry>,
    pub(crate) config: DesignConfig,
    pub(crate) state: DesignState,
    pub(crate) stack: ActivityStack,
    pub(crate) listeners: ListenerRegistry,
    /// element → validator → findings
    pub(crate) errors: BTreeMap<ElementId, BTreeMap<String, Vec<SemanticError>>>,
    pub(crate) style_sheets: BTreeSet<String>,
    /// Commands currently running; only the outermost one logs
    command_depth: usize,
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("root", &self.state.root())
            .field("elements", &self.state.elements().count())
            .field("stack", &self.stack)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl Module {
    /// # Errors
    ///
    /// Returns `InvalidSchema` if `kind` is not a module kind defined by the
    /// schema, or `UnknownValidator` if the schema triggers a validator the
    /// registry lacks.
    pub fn new(
        kind: ElementKind,
        schema: Arc<Schema>,
        validators: Arc<ValidatorRegistry>,
        config: DesignConfig,
    ) -> Result<Self> {
        if !kind.is_module() || schema.defn(kind).is_none() {
            return Err(DesignError::InvalidSchema {
                reason: format!("{} is not a module kind of this schema", kind),
            });
        }
        validators.check_covers(&schema)?;
        Ok(Self {
            state: DesignState::new(kind, config.track_element_ids),
            stack: ActivityStack::new(config.undo_limit, config.filter_events),
            schema,
            validators,
            config,
            listeners: ListenerRegistry::default(),
            errors: BTreeMap::new(),
            style_sheets: BTreeSet::new(),
            command_depth: 0,
        })
    }

    /// Empty report design over the built-in dictionary
    ///
    /// # Errors
    ///
    /// See [`Module::new`].
    pub fn report_design() -> Result<Self> {
        Self::new(
            ElementKind::ReportDesign,
            Arc::new(Schema::report_design()),
            Arc::new(ValidatorRegistry::builtin()),
            DesignConfig::default(),
        )
    }

    /// Empty library over the built-in dictionary
    ///
    /// # Errors
    ///
    /// See [`Module::new`].
    pub fn library() -> Result<Self> {
        Self::new(
            ElementKind::Library,
            Arc::new(Schema::report_design()),
            Arc::new(ValidatorRegistry::builtin()),
            DesignConfig::default(),
        )
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    pub fn state(&self) -> &DesignState {
        &self.state
    }

    pub fn stack(&self) -> &ActivityStack {
        &self.stack
    }

    pub fn root(&self) -> ElementId {
        self.state.root()
    }

    /// # Errors
    ///
    /// Returns `ElementNotFound` if `id` is not in the arena.
    pub fn element(&self, id: ElementId) -> Result<&DesignElement> {
        self.state.element(id)
    }

    pub fn is_live(&self, id: ElementId) -> bool {
        self.state.is_live(id)
    }

    /// Create a detached element
    ///
    /// # Errors
    ///
    /// Returns `InvalidSchema` for kinds the schema does not define and
    /// `AbstractElement` for abstract kinds.
    pub fn create_element(&mut self, kind: ElementKind) -> Result<ElementId> {
        self.logged("create_element", None, |m| {
            let defn = m.schema.defn(kind).ok_or_else(|| DesignError::InvalidSchema {
                reason: format!("kind {} is not defined", kind),
            })?;
            if defn.is_abstract {
                return Err(DesignError::AbstractElement { kind });
            }
            Ok(m.state.allocate(kind))
        })
    }

    pub fn find(&self, space: NameSpaceKind, name: &str) -> Option<ElementId> {
        self.state.name_spaces().lookup(space, name)
    }

    pub fn find_style(&self, name: &str) -> Option<ElementId> {
        self.find(NameSpaceKind::Style, name)
    }

    // ----- transactions -----

    pub fn start_trans(&mut self, label: impl Into<String>) {
        self.stack.start_trans(label);
    }

    pub fn start_trans_with(&mut self, label: impl Into<String>, options: TransOptions) {
        self.stack.start_trans_with(label, options);
    }

    /// Execute one record inside the innermost open transaction
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` when no transaction is open, or the record's
    /// apply error.
    pub fn execute(&mut self, record: Record) -> Result<()> {
        self.stack.execute(&mut self.state, record)
    }

    /// Commit the innermost transaction; the outermost one also validates
    /// and notifies
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` when no transaction is open.
    pub fn commit(&mut self) -> Result<()> {
        if let CommitOutcome::Settled(settled) = self.stack.commit()? {
            self.settle(settled);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NoTransaction` when no transaction is open.
    pub fn rollback(&mut self) -> Result<()> {
        self.stack.rollback(&mut self.state)
    }

    /// # Errors
    ///
    /// Returns `TransactionInProgress` or `NothingToUndo`.
    pub fn undo(&mut self) -> Result<()> {
        self.logged("undo", None, |m| {
            let settled = m.stack.undo(&mut m.state)?;
            m.settle(settled);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Returns `TransactionInProgress` or `NothingToRedo`.
    pub fn redo(&mut self) -> Result<()> {
        self.logged("redo", None, |m| {
            let settled = m.stack.redo(&mut m.state)?;
            m.settle(settled);
            Ok(())
        })
    }

    pub fn mark_saved(&mut self) {
        self.stack.mark_saved();
    }

    pub fn is_dirty(&self) -> bool {
        self.stack.is_dirty()
    }

    pub fn flush_history(&mut self) {
        self.stack.flush();
    }

    pub fn set_undo_limit(&mut self, limit: usize) {
        self.config.undo_limit = limit;
        self.stack.set_undo_limit(limit);
    }

    fn settle(&mut self, settled: Settled) {
        if settled.validate && self.config.validate_on_commit {
            executor::validate_records(self, &settled.records);
        }
        self.listeners.dispatch(&settled.notifications);
    }

    /// Run a public command, logging one start line and one end or
    /// end_error line unless an enclosing command already does
    pub(crate) fn logged<T>(
        &mut self,
        op: &'static str,
        subject: Option<ElementId>,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.command_depth > 0 {
            return body(self);
        }
        log_op_start!(op, element_id = ?subject.map(ElementId::get));
        let start = Instant::now();
        self.command_depth += 1;
        let result = body(self);
        self.command_depth -= 1;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => {
                log_op_end!(op, duration_ms = duration_ms);
            }
            Err(e) => {
                log_op_error!(op, e.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    /// Run `body` in its own transaction, rolling back on error
    pub(crate) fn run_in_transaction<T>(
        &mut self,
        label: &str,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.stack.start_trans(label);
        match body(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                self.stack.rollback(&mut self.state)?;
                Err(err)
            }
        }
    }

    // ----- listeners -----

    pub fn add_listener(
        &mut self,
        scope: ListenerScope,
        listener: Box<dyn DesignListener>,
    ) -> ListenerId {
        self.listeners.add(scope, listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn add_stack_listener(&mut self, listener: Box<dyn ActivityStackListener>) {
        self.stack.add_listener(listener);
    }

    // ----- validation -----

    /// Validate every live element, replacing all stored findings
    pub fn semantic_check(&mut self) -> Vec<SemanticError> {
        executor::validate_all(self);
        self.all_errors()
    }

    /// Stored findings in tree order
    pub fn all_errors(&self) -> Vec<SemanticError> {
        self.state
            .live_elements()
            .into_iter()
            .flat_map(|id| self.errors_of(id))
            .collect()
    }

    /// Findings stored under `element`
    pub fn errors_of(&self, element: ElementId) -> Vec<SemanticError> {
        self.errors
            .get(&element)
            .map(|by_validator| by_validator.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Register an external style sheet as loaded
    pub fn load_style_sheet(&mut self, name: impl Into<String>) {
        self.style_sheets.insert(name.into());
    }

    pub fn style_sheets(&self) -> &BTreeSet<String> {
        &self.style_sheets
    }

    // ----- property lookup -----

    /// User property definition visible on `element`, own or inherited
    pub fn user_property_defn(&self, element: ElementId, name: &str) -> Option<&UserPropertyDefn> {
        std::iter::once(element)
            .chain(self.state.extends_chain(element))
            .filter_map(|id| self.state.get(id))
            .find_map(|el| el.user_property(name))
    }

    /// Kind of property `name` on `element`, from the schema or a user
    /// property definition
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` or `PropertyNotFound`.
    pub fn property_kind(&self, element: ElementId, name: &str) -> Result<PropertyKind> {
        let kind = self.state.element(element)?.kind();
        if let Some(defn) = self.schema.property_defn(kind, name) {
            return Ok(defn.kind.clone());
        }
        self.user_property_defn(element, name)
            .map(|d| d.kind.clone())
            .ok_or_else(|| DesignError::PropertyNotFound {
                element,
                property: name.to_string(),
            })
    }

    /// Effective value: local, then the extends chain, then the style (for
    /// style properties), then the schema default
    ///
    /// Parents and styles that are no longer in the design are skipped for a
    /// live element.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` or `PropertyNotFound`.
    pub fn property(&self, element: ElementId, name: &str) -> Result<Option<PropertyValue>> {
        let el = self.state.element(element)?;
        let defn = self.schema.property_defn(el.kind(), name);
        if defn.is_none() && self.user_property_defn(element, name).is_none() {
            return Err(DesignError::PropertyNotFound {
                element,
                property: name.to_string(),
            });
        }

        if let Some(value) = el.local_property(name) {
            return Ok(Some(value.clone()));
        }
        // A live element never reads through a link to one outside the design
        let live = self.state.is_live(element);
        let reachable = |id: &ElementId| !live || self.state.is_live(*id);
        let chain: Vec<ElementId> = self
            .state
            .extends_chain(element)
            .into_iter()
            .take_while(reachable)
            .collect();
        if defn.map_or(true, |d| d.inheritable) {
            for parent in &chain {
                if let Some(value) = self.state.get(*parent).and_then(|p| p.local_property(name)) {
                    return Ok(Some(value.clone()));
                }
            }
        }
        if let Some(defn) = defn {
            if defn.style_property {
                let style = std::iter::once(element)
                    .chain(chain)
                    .filter_map(|id| self.state.get(id))
                    .find_map(|e| e.local_property(STYLE_PROP))
                    .and_then(PropertyValue::as_element_ref)
                    .and_then(ElementRefValue::resolved_id)
                    .filter(reachable);
                if let Some(value) = style
                    .and_then(|s| self.state.get(s))
                    .and_then(|s| s.local_property(name))
                {
                    return Ok(Some(value.clone()));
                }
            }
            return Ok(defn.default.clone());
        }
        Ok(None)
    }

    /// # Errors
    ///
    /// Returns `Serialization` if the state cannot be encoded.
    pub fn state_digest(&self) -> Result<String> {
        state_digest(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{content_ops, property_ops};
    use crate::schema::slots;

    #[test]
    fn test_non_module_root_is_rejected() {
        let err = Module::new(
            ElementKind::Table,
            Arc::new(Schema::report_design()),
            Arc::new(ValidatorRegistry::builtin()),
            DesignConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DesignError::InvalidSchema { .. }));
    }

    #[test]
    fn test_abstract_kind_cannot_be_created() {
        let mut module = Module::report_design().unwrap();
        let err = module.create_element(ElementKind::ReportItem).unwrap_err();
        assert_eq!(
            err,
            DesignError::AbstractElement {
                kind: ElementKind::ReportItem
            }
        );
    }

    #[test]
    fn test_style_property_falls_back_to_style_then_default() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();

        let style = module.create_element(ElementKind::Style).unwrap();
        crate::ops::name_ops::set_name(&mut module, style, Some("s1")).unwrap();
        property_ops::set_property(&mut module, style, "color", Some(PropertyValue::string("red")))
            .unwrap();
        content_ops::add(&mut module, root, style, slots::STYLES.into(), None).unwrap();

        let label = module.create_element(ElementKind::Label).unwrap();
        content_ops::add(&mut module, root, label, slots::BODY.into(), None).unwrap();
        assert_eq!(module.property(label, "color").unwrap(), None);

        property_ops::set_style(&mut module, label, Some(style)).unwrap();
        assert_eq!(
            module.property(label, "color").unwrap(),
            Some(PropertyValue::string("red"))
        );

        let cell = module.create_element(ElementKind::Cell).unwrap();
        assert_eq!(
            module.property(cell, "colSpan").unwrap(),
            Some(PropertyValue::Integer(1))
        );
        assert!(matches!(
            module.property(cell, "nope").unwrap_err(),
            DesignError::PropertyNotFound { .. }
        ));
    }

    #[test]
    fn test_live_element_ignores_style_outside_the_design() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let style = module.create_element(ElementKind::Style).unwrap();
        crate::ops::name_ops::set_name(&mut module, style, Some("s1")).unwrap();
        property_ops::set_property(&mut module, style, "color", Some(PropertyValue::string("red")))
            .unwrap();
        content_ops::add(&mut module, root, style, slots::STYLES.into(), None).unwrap();
        let label = module.create_element(ElementKind::Label).unwrap();
        content_ops::add(&mut module, root, label, slots::BODY.into(), None).unwrap();
        property_ops::set_style(&mut module, label, Some(style)).unwrap();

        // Link left behind without going through a command
        module.state.detach(root, &slots::STYLES.into(), style, 0).unwrap();

        assert_eq!(module.property(label, "color").unwrap(), None);
    }
}
