#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Scenario 5: Rollback Is Silent
///
/// Records executed in a transaction that is rolled back leave no trace in
/// the design and deliver no notifications.
mod common;

use common::{add_named, report_with_page, slot_contents};
use rdm_core::activity::{Action, Record};
use rdm_core::schema::{slots, ElementKind, NameSpaceKind};
use rdm_core::{DesignError, PropertyValue};

#[test]
fn test_scenario_05_rollback_of_three_records_fires_nothing() {
    // GIVEN a design with a label and a detached text element
    let mut module = report_with_page();
    let root = module.root();
    let label = add_named(&mut module, root, slots::BODY, ElementKind::Label, "hello");
    let text = module.create_element(ElementKind::Text).unwrap();
    let before = module.state_digest().unwrap();
    let undo_depth = module.stack().undo_depth();
    let seen = common::record_notifications(&mut module);

    // WHEN three records run inside a transaction
    module.start_trans("edit");
    module
        .execute(Record::Property {
            element: label,
            property: "text".to_string(),
            old: None,
            new: Some(PropertyValue::string("hi")),
        })
        .unwrap();
    module
        .execute(Record::Name {
            element: label,
            old: Some("hello".to_string()),
            new: Some("renamed".to_string()),
        })
        .unwrap();
    module
        .execute(Record::Content {
            container: root,
            location: slots::BODY.into(),
            content: text,
            position: 1,
            action: Action::Add,
            notify_content: false,
        })
        .unwrap();
    assert_eq!(slot_contents(&module, root, slots::BODY), vec![label, text]);

    // AND the transaction is rolled back
    module.rollback().unwrap();

    // THEN none of the effects are observable
    assert_eq!(module.state_digest().unwrap(), before);
    assert_eq!(slot_contents(&module, root, slots::BODY), vec![label]);
    assert_eq!(module.element(label).unwrap().name(), Some("hello"));
    assert_eq!(module.find(NameSpaceKind::Element, "hello"), Some(label));

    // AND nothing was delivered or recorded
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(module.stack().undo_depth(), undo_depth);
}

#[test]
fn test_scenario_05_nested_failure_rolls_back_only_the_command() {
    // GIVEN an outer transaction holding one successful change
    let mut module = report_with_page();
    let root = module.root();
    let label = add_named(&mut module, root, slots::BODY, ElementKind::Label, "hello");
    let seen = common::record_notifications(&mut module);
    module.start_trans("outer");
    rdm_core::ops::property_ops::set_property(
        &mut module,
        label,
        "text",
        Some(PropertyValue::string("kept")),
    )
    .unwrap();

    // WHEN a nested command fails
    let style = module.create_element(ElementKind::Style).unwrap();
    let err = rdm_core::ops::content_ops::add(&mut module, root, style, slots::STYLES.into(), None)
        .unwrap_err();
    assert!(matches!(err, DesignError::NameRequired { .. }));

    // THEN nothing has been delivered while the outer transaction is open
    assert!(seen.lock().unwrap().is_empty());

    // WHEN the outer transaction commits
    module.commit().unwrap();

    // THEN the earlier change survives and its notification arrives
    assert_eq!(
        module.element(label).unwrap().local_property("text"),
        Some(&PropertyValue::string("kept"))
    );
    assert!(!seen.lock().unwrap().is_empty());
    assert_eq!(module.stack().undo_label(), Some("outer"));
}

#[test]
fn test_scenario_05_execute_needs_an_open_transaction() {
    // GIVEN a design without an open transaction
    let mut module = report_with_page();
    let root = module.root();

    // WHEN a record is executed directly
    let err = module
        .execute(Record::Property {
            element: root,
            property: "author".to_string(),
            old: None,
            new: Some(PropertyValue::string("me")),
        })
        .unwrap_err();

    // THEN it is refused
    assert_eq!(err, DesignError::NoTransaction);
}
