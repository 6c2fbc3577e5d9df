#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Scenario 4: Components Inheritance Order
///
/// In the module components slot every element stays after the elements it
/// extends and before the elements that extend it.
mod common;

use common::{add_named, slot_contents};
use rdm_core::ops::{content_ops, extends_ops};
use rdm_core::schema::{slots, ElementKind};
use rdm_core::{DesignError, ElementId, Module};

/// Components [a, x, b, d] where x extends a and d extends x
fn library_chain() -> (Module, [ElementId; 4]) {
    let mut module = Module::library().unwrap();
    let root = module.root();
    let a = add_named(&mut module, root, slots::COMPONENTS, ElementKind::Label, "a");
    let x = add_named(&mut module, root, slots::COMPONENTS, ElementKind::Label, "x");
    let b = add_named(&mut module, root, slots::COMPONENTS, ElementKind::Label, "b");
    let d = add_named(&mut module, root, slots::COMPONENTS, ElementKind::Label, "d");
    extends_ops::set_extends(&mut module, x, Some(a)).unwrap();
    extends_ops::set_extends(&mut module, d, Some(x)).unwrap();
    (module, [a, x, b, d])
}

#[test]
fn test_scenario_04_moving_behind_a_derived_element_is_forbidden() {
    // GIVEN components [a, x, b, d] with a <- x <- d
    let (mut module, [a, x, b, d]) = library_chain();
    let root = module.root();

    // WHEN x is moved behind d
    let err = content_ops::move_position(&mut module, x, 4).unwrap_err();

    // THEN the move is refused
    assert!(matches!(err, DesignError::MoveForbidden { content, .. } if content == x));

    // AND the order is unchanged
    assert_eq!(slot_contents(&module, root, slots::COMPONENTS), vec![a, x, b, d]);
}

#[test]
fn test_scenario_04_moving_ahead_of_an_ancestor_is_forbidden() {
    // GIVEN components [a, x, b, d] with a <- x <- d
    let (mut module, [a, x, b, d]) = library_chain();
    let root = module.root();

    // WHEN x is moved to the front
    let err = content_ops::move_position(&mut module, x, 0).unwrap_err();

    // THEN the move is refused and nothing changes
    assert!(matches!(err, DesignError::MoveForbidden { .. }));
    assert_eq!(slot_contents(&module, root, slots::COMPONENTS), vec![a, x, b, d]);
    assert!(!module.stack().can_redo());
}

#[test]
fn test_scenario_04_moving_within_the_allowed_window_succeeds() {
    // GIVEN components [a, x, b, d] with a <- x <- d
    let (mut module, [a, x, b, d]) = library_chain();
    let root = module.root();

    // WHEN x is moved to just before d
    content_ops::move_position(&mut module, x, 3).unwrap();

    // THEN it sits between its ancestor and its derived element
    assert_eq!(slot_contents(&module, root, slots::COMPONENTS), vec![a, b, x, d]);

    // WHEN the move is undone
    module.undo().unwrap();

    // THEN the original order is back
    assert_eq!(slot_contents(&module, root, slots::COMPONENTS), vec![a, x, b, d]);
}

#[test]
fn test_scenario_04_unchanged_position_is_a_silent_no_op() {
    // GIVEN components [a, x, b, d]
    let (mut module, [a, x, b, d]) = library_chain();
    let root = module.root();
    let depth = module.stack().undo_depth();

    // WHEN x is "moved" to where it already is
    content_ops::move_position(&mut module, x, 1).unwrap();
    content_ops::move_position(&mut module, x, 2).unwrap();

    // THEN nothing is recorded
    assert_eq!(module.stack().undo_depth(), depth);
    assert_eq!(slot_contents(&module, root, slots::COMPONENTS), vec![a, x, b, d]);
}
