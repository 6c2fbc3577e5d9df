//! Report Design Model core - transactional command and validation engine
//!
//! This crate provides the in-memory object model of a report design or
//! library and the machinery that edits it:
//! - Design tree arena with slots, typed properties, names and references
//! - Activity records and the undo/redo activity stack
//! - Content commands (add, remove, move, rename, set property/style/extends)
//! - Post-commit semantic validation driven by schema triggers
//! - Change notification to element, name-space and module listeners
//! - Structural loading through `DesignBuilder` and JSON design scripts

pub mod activity;
pub mod apply;
pub mod builder;
pub mod commands;
pub mod config;
pub mod digest;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod module;
pub mod ops;
pub mod schema;
pub mod validation;

// Re-export commonly used types
pub use apply::{apply, CommandOutput};
pub use builder::{DesignBuilder, DesignScript};
pub use commands::DesignCommand;
pub use config::DesignConfig;
pub use errors::{DesignError, ExError, ExErrorKind, Result};
pub use model::{ContentLocation, ElementId, ElementRefValue, PropertyValue};
pub use module::Module;
pub use ops::RemoveStrategy;
pub use schema::{ElementKind, Schema};
pub use validation::{SemanticError, ValidatorRegistry};
