#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Scenario 3: Duplicate Group Names
///
/// Groups of one listing naming scope share a case-insensitive name space;
/// each duplicated name is reported once, on its second occurrence.
mod common;

use common::{add_unnamed, report_with_page};
use rdm_core::ops::property_ops;
use rdm_core::schema::{slots, ElementKind};
use rdm_core::validation::validators::GroupNameValidator;
use rdm_core::validation::{SemanticErrorKind, ValidationContext};
use rdm_core::{ElementId, Module, PropertyValue};

fn named_group(module: &mut Module, listing: ElementId, name: &str) -> ElementId {
    let group = add_unnamed(module, listing, slots::GROUPS, ElementKind::ListGroup);
    property_ops::set_property(module, group, "groupName", Some(PropertyValue::string(name)))
        .unwrap();
    group
}

fn group_errors(module: &Module, listing: ElementId) -> Vec<ElementId> {
    module
        .errors_of(listing)
        .into_iter()
        .filter(|e| e.kind == SemanticErrorKind::DuplicateGroupName)
        .map(|e| e.element)
        .collect()
}

#[test]
fn test_scenario_03_second_occurrence_reported_once() {
    // GIVEN a list without a data set
    let mut module = report_with_page();
    let root = module.root();
    let list = add_unnamed(&mut module, root, slots::BODY, ElementKind::List);

    // WHEN two groups are both named "g1"
    named_group(&mut module, list, "g1");
    let second = named_group(&mut module, list, "g1");

    // THEN exactly one duplicate-group-name error names the second group
    assert_eq!(group_errors(&module, list), vec![second]);

    // WHEN a third group is named "G1"
    named_group(&mut module, list, "G1");

    // THEN it is not reported separately
    assert_eq!(group_errors(&module, list), vec![second]);
}

#[test]
fn test_scenario_03_renaming_clears_the_finding() {
    // GIVEN two groups named "g1"
    let mut module = report_with_page();
    let root = module.root();
    let list = add_unnamed(&mut module, root, slots::BODY, ElementKind::List);
    named_group(&mut module, list, "g1");
    let second = named_group(&mut module, list, "g1");
    assert_eq!(group_errors(&module, list), vec![second]);

    // WHEN the second group is renamed
    property_ops::set_property(&mut module, second, "groupName", Some(PropertyValue::string("g2")))
        .unwrap();

    // THEN no duplicate remains
    assert!(group_errors(&module, list).is_empty());

    // WHEN the rename is undone
    module.undo().unwrap();

    // THEN the finding is back
    assert_eq!(group_errors(&module, list), vec![second]);
}

#[test]
fn test_scenario_03_check_before_adding_a_group() {
    // GIVEN a list with a group named "region"
    let mut module = report_with_page();
    let root = module.root();
    let list = add_unnamed(&mut module, root, slots::BODY, ElementKind::List);
    named_group(&mut module, list, "region");

    // WHEN a UI asks whether "REGION" may be added
    let ctx = ValidationContext::new(module.state(), module.schema(), module.style_sheets());
    let clash = GroupNameValidator::validate_for_adding_group(&ctx, list, "REGION");
    let fine = GroupNameValidator::validate_for_adding_group(&ctx, list, "country");

    // THEN only the clashing name is refused
    assert_eq!(clash.len(), 1);
    assert_eq!(clash[0].kind, SemanticErrorKind::DuplicateGroupName);
    assert!(fine.is_empty());
}
