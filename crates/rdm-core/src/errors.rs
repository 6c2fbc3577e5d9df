use rdm_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::{ContentLocation, ElementId};
use crate::schema::ElementKind;

/// Result type alias using DesignError
pub type Result<T> = std::result::Result<T, DesignError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Stable classification of every failure a command can raise. Each kind maps
/// to a stable error code used in log lines, CLI output and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lookup / input
    NotFound,
    InvalidInput,
    AlreadyExists,

    // Containment
    NotContainer,
    SlotNotFound,
    WrongType,
    Recursive,
    SlotIsFull,
    InvalidContextContainment,
    DropForbidden,
    HasDescendants,
    MoveForbidden,

    // Naming
    NameRequired,
    NameForbidden,
    DuplicateName,
    HasReferences,

    // Properties and references
    PropertyNotFound,
    InvalidValue,
    UnresolvedReference,
    WrongElementType,
    WrongExtensionType,
    ExtendsForbidden,
    CircularExtends,

    // Activity stack
    TransactionState,

    // Infrastructure
    InvalidSchema,
    Config,
    Serialization,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::NotContainer => "ERR_NOT_CONTAINER",
            ExErrorKind::SlotNotFound => "ERR_SLOT_NOT_FOUND",
            ExErrorKind::WrongType => "ERR_WRONG_TYPE",
            ExErrorKind::Recursive => "ERR_RECURSIVE",
            ExErrorKind::SlotIsFull => "ERR_SLOT_IS_FULL",
            ExErrorKind::InvalidContextContainment => "ERR_INVALID_CONTEXT_CONTAINMENT",
            ExErrorKind::DropForbidden => "ERR_DROP_FORBIDDEN",
            ExErrorKind::HasDescendants => "ERR_HAS_DESCENDANTS",
            ExErrorKind::MoveForbidden => "ERR_MOVE_FORBIDDEN",
            ExErrorKind::NameRequired => "ERR_NAME_REQUIRED",
            ExErrorKind::NameForbidden => "ERR_NAME_FORBIDDEN",
            ExErrorKind::DuplicateName => "ERR_DUPLICATE_NAME",
            ExErrorKind::HasReferences => "ERR_HAS_REFERENCES",
            ExErrorKind::PropertyNotFound => "ERR_PROPERTY_NOT_FOUND",
            ExErrorKind::InvalidValue => "ERR_INVALID_VALUE",
            ExErrorKind::UnresolvedReference => "ERR_UNRESOLVED_REFERENCE",
            ExErrorKind::WrongElementType => "ERR_WRONG_ELEMENT_TYPE",
            ExErrorKind::WrongExtensionType => "ERR_WRONG_EXTENSION_TYPE",
            ExErrorKind::ExtendsForbidden => "ERR_EXTENDS_FORBIDDEN",
            ExErrorKind::CircularExtends => "ERR_CIRCULAR_EXTENDS",
            ExErrorKind::TransactionState => "ERR_TRANSACTION_STATE",
            ExErrorKind::InvalidSchema => "ERR_INVALID_SCHEMA",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification plus context for log lines and handle-layer responses.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    element_id: Option<String>,
    property: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            element_id: None,
            property: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add element context
    pub fn with_element_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    /// Add property context
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(element_id) = &self.element_id {
            write!(f, " (element: {})", element_id)?;
        }
        if let Some(property) = &self.property {
            write!(f, " (property: {})", property)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Every way a design command can fail
///
/// Precondition failures are raised before anything is executed. Failures
/// discovered while a command is already executing records roll the command's
/// transaction back before they reach the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    // ===== Lookup =====
    #[error("Element not found: {element}")]
    ElementNotFound { element: ElementId },

    #[error("Cannot create an element of abstract kind {kind}")]
    AbstractElement { kind: ElementKind },

    // ===== Containment =====
    #[error("Element {element} is not a container")]
    NotContainer { element: ElementId },

    #[error("Element {element} has no content location {location}")]
    SlotNotFound {
        element: ElementId,
        location: ContentLocation,
    },

    #[error("{location} of {container} cannot hold a {kind}")]
    WrongType {
        container: ElementId,
        location: ContentLocation,
        kind: ElementKind,
    },

    #[error("Adding {content} to {container} would make it contain itself")]
    Recursive {
        container: ElementId,
        content: ElementId,
    },

    #[error("{location} of {container} already holds its single content")]
    SlotIsFull {
        container: ElementId,
        location: ContentLocation,
    },

    #[error("{content} cannot be placed under {container}: {reason}")]
    InvalidContextContainment {
        container: ElementId,
        content: ElementId,
        reason: String,
    },

    #[error("Element {content} is already contained by {container}")]
    ContentAlreadyContained {
        content: ElementId,
        container: ElementId,
    },

    #[error("{location} of {container} does not contain {content}")]
    ContentNotFound {
        container: ElementId,
        location: ContentLocation,
        content: ElementId,
    },

    #[error("Element {content} is not contained by anything")]
    NotContained { content: ElementId },

    #[error("Element {content} cannot be dropped")]
    DropForbidden { content: ElementId },

    #[error("Element {content} has derived elements and nothing to re-parent them onto")]
    HasDescendants { content: ElementId },

    #[error("Element {content} cannot be moved: {reason}")]
    MoveForbidden { content: ElementId, reason: String },

    #[error("Position {position} is out of range for {location} (length {len})")]
    InvalidPosition {
        location: ContentLocation,
        position: usize,
        len: usize,
    },

    // ===== Naming =====
    #[error("Element {element} requires a name")]
    NameRequired { element: ElementId },

    #[error("Element {element} cannot have a name")]
    NameForbidden { element: ElementId },

    #[error("Name '{name}' is already used in the {scope} name space")]
    DuplicateName { name: String, scope: String },

    #[error("Cannot clear the name of {element}: other elements refer to it")]
    HasReferences { element: ElementId },

    // ===== Properties and references =====
    #[error("Property '{property}' is not defined on {element}")]
    PropertyNotFound { element: ElementId, property: String },

    #[error("Property '{property}' cannot be set directly")]
    ReservedProperty { property: String },

    #[error("Invalid value for '{property}': {reason}")]
    InvalidValue { property: String, reason: String },

    #[error("Property '{property}' is already defined on {element}")]
    DuplicateProperty { element: ElementId, property: String },

    #[error("Reference '{target}' in '{property}' of {element} does not resolve")]
    UnresolvedReference {
        element: ElementId,
        property: String,
        target: String,
    },

    #[error("'{property}' expects a {expected}, got a {actual}")]
    WrongElementType {
        property: String,
        expected: ElementKind,
        actual: ElementKind,
    },

    #[error("Element {element} cannot extend {parent}: kinds differ")]
    WrongExtensionType { element: ElementId, parent: ElementId },

    #[error("Element {element} cannot use extends here: {reason}")]
    ExtendsForbidden { element: ElementId, reason: String },

    #[error("Element {element} cannot extend {parent}: extends would be circular")]
    CircularExtends { element: ElementId, parent: ElementId },

    // ===== Activity stack =====
    #[error("No transaction is open")]
    NoTransaction,

    #[error("Cannot undo or redo while {depth} transaction(s) are open")]
    TransactionInProgress { depth: usize },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Record cannot be {action} from state {state}")]
    InvalidRecordTransition { state: String, action: String },

    // ===== Infrastructure =====
    #[error("Validator '{name}' is not registered")]
    UnknownValidator { name: String },

    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DesignError {
    /// Error-facility classification of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            DesignError::ElementNotFound { .. } | DesignError::ContentNotFound { .. } => {
                ExErrorKind::NotFound
            }
            DesignError::AbstractElement { .. }
            | DesignError::ContentAlreadyContained { .. }
            | DesignError::NotContained { .. }
            | DesignError::InvalidPosition { .. }
            | DesignError::ReservedProperty { .. } => ExErrorKind::InvalidInput,
            DesignError::DuplicateProperty { .. } => ExErrorKind::AlreadyExists,
            DesignError::NotContainer { .. } => ExErrorKind::NotContainer,
            DesignError::SlotNotFound { .. } => ExErrorKind::SlotNotFound,
            DesignError::WrongType { .. } => ExErrorKind::WrongType,
            DesignError::Recursive { .. } => ExErrorKind::Recursive,
            DesignError::SlotIsFull { .. } => ExErrorKind::SlotIsFull,
            DesignError::InvalidContextContainment { .. } => {
                ExErrorKind::InvalidContextContainment
            }
            DesignError::DropForbidden { .. } => ExErrorKind::DropForbidden,
            DesignError::HasDescendants { .. } => ExErrorKind::HasDescendants,
            DesignError::MoveForbidden { .. } => ExErrorKind::MoveForbidden,
            DesignError::NameRequired { .. } => ExErrorKind::NameRequired,
            DesignError::NameForbidden { .. } => ExErrorKind::NameForbidden,
            DesignError::DuplicateName { .. } => ExErrorKind::DuplicateName,
            DesignError::HasReferences { .. } => ExErrorKind::HasReferences,
            DesignError::PropertyNotFound { .. } => ExErrorKind::PropertyNotFound,
            DesignError::InvalidValue { .. } => ExErrorKind::InvalidValue,
            DesignError::UnresolvedReference { .. } => ExErrorKind::UnresolvedReference,
            DesignError::WrongElementType { .. } => ExErrorKind::WrongElementType,
            DesignError::WrongExtensionType { .. } => ExErrorKind::WrongExtensionType,
            DesignError::ExtendsForbidden { .. } => ExErrorKind::ExtendsForbidden,
            DesignError::CircularExtends { .. } => ExErrorKind::CircularExtends,
            DesignError::NoTransaction
            | DesignError::TransactionInProgress { .. }
            | DesignError::NothingToUndo
            | DesignError::NothingToRedo => ExErrorKind::TransactionState,
            DesignError::InvalidRecordTransition { .. } | DesignError::Internal { .. } => {
                ExErrorKind::Internal
            }
            DesignError::UnknownValidator { .. } | DesignError::InvalidSchema { .. } => {
                ExErrorKind::InvalidSchema
            }
            DesignError::Config { .. } => ExErrorKind::Config,
            DesignError::Serialization { .. } => ExErrorKind::Serialization,
        }
    }

    /// Element the error is about, when there is one
    pub fn element(&self) -> Option<ElementId> {
        match self {
            DesignError::ElementNotFound { element }
            | DesignError::NotContainer { element }
            | DesignError::SlotNotFound { element, .. }
            | DesignError::NameRequired { element }
            | DesignError::NameForbidden { element }
            | DesignError::HasReferences { element }
            | DesignError::PropertyNotFound { element, .. }
            | DesignError::DuplicateProperty { element, .. }
            | DesignError::UnresolvedReference { element, .. }
            | DesignError::WrongExtensionType { element, .. }
            | DesignError::ExtendsForbidden { element, .. }
            | DesignError::CircularExtends { element, .. } => Some(*element),
            DesignError::Recursive { content, .. }
            | DesignError::InvalidContextContainment { content, .. }
            | DesignError::ContentAlreadyContained { content, .. }
            | DesignError::ContentNotFound { content, .. }
            | DesignError::NotContained { content }
            | DesignError::DropForbidden { content }
            | DesignError::HasDescendants { content }
            | DesignError::MoveForbidden { content, .. } => Some(*content),
            DesignError::WrongType { container, .. } | DesignError::SlotIsFull { container, .. } => {
                Some(*container)
            }
            _ => None,
        }
    }

    /// Property the error is about, when there is one
    pub fn property(&self) -> Option<&str> {
        match self {
            DesignError::PropertyNotFound { property, .. }
            | DesignError::ReservedProperty { property }
            | DesignError::InvalidValue { property, .. }
            | DesignError::DuplicateProperty { property, .. }
            | DesignError::UnresolvedReference { property, .. }
            | DesignError::WrongElementType { property, .. } => Some(property),
            _ => None,
        }
    }
}

impl From<DesignError> for ExError {
    fn from(err: DesignError) -> Self {
        let mut ex = ExError::new(err.kind()).with_message(err.to_string());
        if let Some(element) = err.element() {
            ex = ex.with_element_id(element.to_string());
        }
        if let Some(property) = err.property() {
            ex = ex.with_property(property);
        }
        ex
    }
}

impl From<&DesignError> for ExError {
    fn from(err: &DesignError) -> Self {
        err.clone().into()
    }
}

impl From<serde_json::Error> for DesignError {
    fn from(err: serde_json::Error) -> Self {
        DesignError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DesignError {
    fn from(err: toml::de::Error) -> Self {
        DesignError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::slots;

    #[test]
    fn test_every_kind_has_err_prefix() {
        let kinds = [
            ExErrorKind::NotFound,
            ExErrorKind::DuplicateName,
            ExErrorKind::MoveForbidden,
            ExErrorKind::TransactionState,
            ExErrorKind::Internal,
        ];
        for kind in kinds {
            assert!(kind.code().starts_with("ERR_"));
        }
    }

    #[test]
    fn test_conversion_carries_element_and_property() {
        let err = DesignError::PropertyNotFound {
            element: ElementId::new(9),
            property: "colour".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::PropertyNotFound);
        assert_eq!(ex.element_id(), Some("#9"));
        assert_eq!(ex.property(), Some("colour"));
        assert!(ex.to_string().starts_with("[ERR_PROPERTY_NOT_FOUND]"));
    }

    #[test]
    fn test_containment_errors_map_to_distinct_codes() {
        let container = ElementId::new(1);
        let location = ContentLocation::Slot(slots::BODY);
        let codes = [
            DesignError::NotContainer { element: container }.kind().code(),
            DesignError::SlotNotFound {
                element: container,
                location: location.clone(),
            }
            .kind()
            .code(),
            DesignError::WrongType {
                container,
                location: location.clone(),
                kind: ElementKind::Style,
            }
            .kind()
            .code(),
            DesignError::SlotIsFull {
                container,
                location,
            }
            .kind()
            .code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_json_error_becomes_serialization() {
        let err: DesignError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }
}
