//! Maps committed records to validator runs
//!
//! ## Trigger mapping
//!
//! - content add/remove: triggers of the content list on the container, and
//!   element triggers of every element in the content's subtree
//! - content reorder: triggers of the content list
//! - property change: triggers of that property, and element triggers of
//!   the element
//! - name, extends and user-property changes: element triggers
//! - content add/remove also re-checks the references of every client of
//!   the moved subtree, and name-space changes re-check every live element
//!   that refers to the bound name
//!
//! A `Focus` trigger validates the element that owns the slot or property;
//! a `Container` trigger validates that element's container. Runs are
//! de-duplicated after each validator maps its target to the element its
//! findings are stored under. Findings replace what was stored for the same
//! (element, validator) pair; findings for elements no longer in the design
//! are dropped.

use std::collections::BTreeSet;

use crate::activity::Record;
use crate::model::{ContentLocation, DesignState, ElementId, ElementRefValue, PropertyValue};
use crate::module::Module;
use crate::schema::{ElementKind, NameSpaceKind, Schema, SemanticTrigger, TriggerTarget};
use crate::validation::{names, ValidationContext};

/// Requested validator runs as (validator name, element) pairs
pub type ValidationTargets = BTreeSet<(String, ElementId)>;

fn push_trigger(
    state: &DesignState,
    owner: ElementId,
    trigger: &SemanticTrigger,
    out: &mut ValidationTargets,
) {
    let target = match trigger.target {
        TriggerTarget::Focus => Some(owner),
        TriggerTarget::Container => state.get(owner).and_then(|el| el.container_id()),
    };
    if let Some(target) = target {
        out.insert((trigger.validator.clone(), target));
    }
}

fn push_element_triggers(
    schema: &Schema,
    state: &DesignState,
    element: ElementId,
    out: &mut ValidationTargets,
) {
    let Some(el) = state.get(element) else { return };
    for trigger in schema.element_triggers(el.kind()) {
        push_trigger(state, element, trigger, out);
    }
}

fn push_content_triggers(
    schema: &Schema,
    state: &DesignState,
    container: ElementId,
    location: &ContentLocation,
    out: &mut ValidationTargets,
) {
    let Some(el) = state.get(container) else { return };
    if let Some(defn) = schema.content_defn(el.kind(), location) {
        for trigger in defn.triggers {
            push_trigger(state, container, trigger, out);
        }
    }
}

/// Name a reference value goes by: its own name, or the name of the
/// element it was resolved to
fn referenced_name<'s>(state: &'s DesignState, value: &'s ElementRefValue) -> Option<&'s str> {
    match value {
        ElementRefValue::Unresolved(name) => Some(name.as_str()),
        ElementRefValue::Resolved(target) => state.get(*target).and_then(|t| t.name()),
    }
}

/// Live elements holding a reference of a kind in `space` named `name`
fn push_name_referrers(
    schema: &Schema,
    state: &DesignState,
    bound: &BTreeSet<(NameSpaceKind, String)>,
    out: &mut ValidationTargets,
) {
    let refers = |kind: ElementKind, value: &ElementRefValue| {
        schema.name_space(kind).is_some_and(|space| {
            referenced_name(state, value).is_some_and(|name| bound.contains(&(space, name.to_string())))
        })
    };
    for id in state.live_elements() {
        let Some(el) = state.get(id) else { continue };
        let by_property = schema.properties(el.kind()).into_iter().any(|defn| {
            defn.kind.reference_target().is_some_and(|kind| {
                el.local_property(&defn.name)
                    .and_then(PropertyValue::as_element_ref)
                    .is_some_and(|value| refers(kind, value))
            })
        });
        let by_extends = el.extends().is_some_and(|value| refers(el.kind(), value));
        if by_property || by_extends {
            out.insert((names::ELEMENT_REFERENCE.to_string(), id));
        }
    }
}

/// Validator runs requested by `records`
pub fn triggered(schema: &Schema, state: &DesignState, records: &[Record]) -> ValidationTargets {
    let mut out = ValidationTargets::new();
    let mut bound = BTreeSet::new();
    for record in records {
        match record {
            Record::Content {
                container,
                location,
                content,
                ..
            } => {
                push_content_triggers(schema, state, *container, location, &mut out);
                for id in state.subtree(*content) {
                    push_element_triggers(schema, state, id, &mut out);
                    for client in state.clients(id) {
                        out.insert((names::ELEMENT_REFERENCE.to_string(), client.referrer));
                    }
                }
            }
            Record::MoveContent {
                container,
                location,
                ..
            } => push_content_triggers(schema, state, *container, location, &mut out),
            Record::Property {
                element, property, ..
            } => {
                if let Some(defn) = state
                    .get(*element)
                    .and_then(|el| schema.property_defn(el.kind(), property))
                {
                    for trigger in &defn.triggers {
                        push_trigger(state, *element, trigger, &mut out);
                    }
                }
                push_element_triggers(schema, state, *element, &mut out);
            }
            Record::Name { element, .. }
            | Record::Extends { element, .. }
            | Record::UserProperty { element, .. } => {
                push_element_triggers(schema, state, *element, &mut out)
            }
            Record::NameSpace { space, name, .. } => {
                bound.insert((*space, name.clone()));
            }
            Record::BackRef { .. } => {}
        }
    }
    if !bound.is_empty() {
        push_name_referrers(schema, state, &bound, &mut out);
    }
    out
}

/// Every trigger of every live element
pub fn all_targets(schema: &Schema, state: &DesignState) -> ValidationTargets {
    let mut out = ValidationTargets::new();
    for id in state.live_elements() {
        let Some(el) = state.get(id) else { continue };
        push_element_triggers(schema, state, id, &mut out);
        for (_, defn) in schema.content_defns(el.kind()) {
            for trigger in defn.triggers {
                push_trigger(state, id, trigger, &mut out);
            }
        }
        for defn in schema.properties(el.kind()) {
            for trigger in &defn.triggers {
                push_trigger(state, id, trigger, &mut out);
            }
        }
    }
    out
}

pub(crate) fn validate_records(module: &mut Module, records: &[Record]) {
    let targets = triggered(&module.schema, &module.state, records);
    run(module, targets);
}

pub(crate) fn validate_all(module: &mut Module) {
    module.errors.clear();
    let targets = all_targets(&module.schema, &module.state);
    run(module, targets);
}

fn run(module: &mut Module, targets: ValidationTargets) {
    let Module {
        schema,
        validators,
        state,
        errors,
        style_sheets,
        ..
    } = module;

    let mut ctx = ValidationContext::new(&*state, &**schema, &*style_sheets);
    let mut seen = BTreeSet::new();
    let mut runs = 0usize;
    for (name, element) in targets {
        if !ctx.state.is_live(element) {
            continue;
        }
        let Some(validator) = validators.get(&name) else {
            tracing::warn!(validator = %name, "validator not registered");
            continue;
        };
        let Some(scope) = validator.scope(&ctx, element) else {
            continue;
        };
        if !seen.insert((name.clone(), scope)) {
            continue;
        }
        let found = validator.validate(&mut ctx, scope);
        runs += 1;
        let stored = errors.entry(scope).or_default();
        if found.is_empty() {
            stored.remove(&name);
        } else {
            stored.insert(name, found);
        }
    }
    let resolutions = ctx.into_resolutions();

    errors.retain(|id, by_validator| !by_validator.is_empty() && state.is_live(*id));
    for resolution in &resolutions {
        if let Err(err) = state.cache_reference(
            resolution.referrer,
            &resolution.property,
            resolution.value.clone(),
        ) {
            tracing::warn!(
                element = %resolution.referrer,
                property = %resolution.property,
                error = %err,
                "failed to cache resolved reference"
            );
        }
    }
    tracing::debug!(
        runs,
        resolved = resolutions.len(),
        stored = errors.len(),
        "semantic validation finished"
    );
}
