use std::collections::HashSet;

use rdm_core::errors::{DesignError, ExError, ExErrorKind};
use rdm_core::schema::{slots, ElementKind};
use rdm_core::{ContentLocation, ElementId};
use rdm_core_types::RequestId;

#[test]
fn test_element_not_found_verifiable_by_kind() {
    let err = DesignError::ElementNotFound {
        element: ElementId::new(42),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.element_id(), Some("#42"));
}

#[test]
fn test_wrong_type_names_the_container() {
    let err = DesignError::WrongType {
        container: ElementId::new(1),
        location: ContentLocation::Slot(slots::STYLES),
        kind: ElementKind::Label,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::WrongType);
    assert_eq!(ex_err.code(), "ERR_WRONG_TYPE");
    assert_eq!(ex_err.element_id(), Some("#1"));
}

#[test]
fn test_duplicate_name_message_names_the_space() {
    let err = DesignError::DuplicateName {
        name: "title".to_string(),
        scope: "style".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::DuplicateName);
    assert!(ex_err.message().contains("'title'"));
    assert!(ex_err.message().contains("style"));
    assert_eq!(ex_err.element_id(), None);
}

#[test]
fn test_unresolved_reference_carries_property() {
    let err = DesignError::UnresolvedReference {
        element: ElementId::new(3),
        property: "style".to_string(),
        target: "missing".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.code(), "ERR_UNRESOLVED_REFERENCE");
    assert_eq!(ex_err.property(), Some("style"));
    assert!(ex_err.message().contains("missing"));
}

#[test]
fn test_stack_errors_share_transaction_state() {
    let errors = [
        DesignError::NoTransaction,
        DesignError::TransactionInProgress { depth: 2 },
        DesignError::NothingToUndo,
        DesignError::NothingToRedo,
    ];
    for err in errors {
        assert_eq!(err.kind(), ExErrorKind::TransactionState);
    }
}

#[test]
fn test_move_forbidden_conversion() {
    let err = DesignError::MoveForbidden {
        content: ElementId::new(7),
        reason: "would precede its parent".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::MoveForbidden);
    assert_eq!(ex_err.code(), "ERR_MOVE_FORBIDDEN");
    assert_eq!(ex_err.element_id(), Some("#7"));
    assert!(ex_err.message().contains("precede"));
}

#[test]
fn test_ex_error_builder_pattern() {
    let request_id = RequestId::new();
    let ex_err = ExError::new(ExErrorKind::PropertyNotFound)
        .with_op("set_property")
        .with_element_id("#12")
        .with_property("colour")
        .with_message("Property not defined")
        .with_request_id(request_id);

    assert_eq!(ex_err.op(), Some("set_property"));
    assert_eq!(ex_err.element_id(), Some("#12"));
    assert_eq!(ex_err.property(), Some("colour"));
    assert!(ex_err.request_id().is_some());
}

#[test]
fn test_ex_error_display() {
    let ex_err = ExError::new(ExErrorKind::NameRequired)
        .with_op("add_content")
        .with_element_id("#5")
        .with_message("Element requires a name");

    let display_str = ex_err.to_string();

    assert!(display_str.starts_with("[ERR_NAME_REQUIRED]"));
    assert!(display_str.contains("add_content"));
    assert!(display_str.contains("#5"));
}

#[test]
fn test_all_error_kinds_have_unique_codes() {
    let kinds = [
        ExErrorKind::NotFound,
        ExErrorKind::InvalidInput,
        ExErrorKind::AlreadyExists,
        ExErrorKind::NotContainer,
        ExErrorKind::SlotNotFound,
        ExErrorKind::WrongType,
        ExErrorKind::Recursive,
        ExErrorKind::SlotIsFull,
        ExErrorKind::InvalidContextContainment,
        ExErrorKind::DropForbidden,
        ExErrorKind::HasDescendants,
        ExErrorKind::MoveForbidden,
        ExErrorKind::NameRequired,
        ExErrorKind::NameForbidden,
        ExErrorKind::DuplicateName,
        ExErrorKind::HasReferences,
        ExErrorKind::PropertyNotFound,
        ExErrorKind::InvalidValue,
        ExErrorKind::UnresolvedReference,
        ExErrorKind::WrongElementType,
        ExErrorKind::WrongExtensionType,
        ExErrorKind::ExtendsForbidden,
        ExErrorKind::CircularExtends,
        ExErrorKind::TransactionState,
        ExErrorKind::InvalidSchema,
        ExErrorKind::Config,
        ExErrorKind::Serialization,
        ExErrorKind::Internal,
    ];

    let codes: HashSet<_> = kinds.iter().map(|k| k.code()).collect();
    assert_eq!(codes.len(), kinds.len());
    for code in codes {
        assert!(code.starts_with("ERR_"));
    }
}
