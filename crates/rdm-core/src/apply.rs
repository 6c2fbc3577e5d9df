//! Command entry point for the handle layer
//!
//! ## Atomicity Contract
//!
//! `apply()` guarantees:
//! - **All-or-nothing**: a command either commits one transaction (or joins
//!   the caller's open one) or leaves the design exactly as it was
//! - **No panics**: invalid input returns a typed
//!   [`DesignError`](crate::errors::DesignError)
//! - **Logged boundary**: one `start` line and one `end` or `end_error` line
//!   per command
//!
//! ## Example
//!
//! ```
//! use rdm_core::{apply, DesignCommand, Module};
//! use rdm_core::schema::{slots, ElementKind};
//!
//! let mut module = Module::report_design().unwrap();
//! let root = module.root();
//! let label = apply(&mut module, DesignCommand::CreateElement { kind: ElementKind::Label })
//!     .unwrap()
//!     .element()
//!     .unwrap();
//! apply(
//!     &mut module,
//!     DesignCommand::AddContent {
//!         container: root,
//!         content: label,
//!         location: slots::BODY.into(),
//!         position: None,
//!     },
//! )
//! .unwrap();
//! assert!(module.is_live(label));
//! ```

use crate::commands::DesignCommand;
use crate::errors::Result;
use crate::model::ElementId;
use crate::module::Module;
use crate::ops::{content_ops, extends_ops, name_ops, property_ops, user_property_ops};

/// What a successful command hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Done,
    /// Id of a newly created element
    Created(ElementId),
    /// Name given by `MakeUniqueName`
    Named(String),
}

impl CommandOutput {
    pub fn element(&self) -> Option<ElementId> {
        match self {
            CommandOutput::Created(id) => Some(*id),
            _ => None,
        }
    }
}

/// Run one command against a module
///
/// # Arguments
///
/// * `module` - Design being edited
/// * `cmd` - Command to execute
///
/// # Errors
///
/// Whatever the underlying command raises; see
/// [`DesignError`](crate::errors::DesignError). The design
/// is unchanged when an error is returned.
pub fn apply(module: &mut Module, cmd: DesignCommand) -> Result<CommandOutput> {
    let op = cmd.op_name();
    let subject = cmd.subject();
    module.logged(op, subject, |m| dispatch(m, cmd))
}

fn dispatch(module: &mut Module, cmd: DesignCommand) -> Result<CommandOutput> {
    match cmd {
        DesignCommand::CreateElement { kind } => {
            module.create_element(kind).map(CommandOutput::Created)
        }
        DesignCommand::AddContent {
            container,
            content,
            location,
            position,
        } => {
            content_ops::add(module, container, content, location, position)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::RemoveContent { content, strategy } => {
            content_ops::remove(module, content, strategy)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::MoveContent {
            content,
            container,
            location,
            position,
        } => {
            content_ops::move_to(module, content, container, location, position)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::MovePosition { content, position } => {
            content_ops::move_position(module, content, position)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::SetName { element, name } => {
            name_ops::set_name(module, element, name.as_deref())?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::MakeUniqueName { element } => {
            name_ops::make_unique_name(module, element).map(CommandOutput::Named)
        }
        DesignCommand::SetProperty {
            element,
            property,
            value,
        } => {
            property_ops::set_property(module, element, &property, value)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::SetStyle { element, style } => {
            property_ops::set_style(module, element, style)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::SetExtends { element, parent } => {
            extends_ops::set_extends(module, element, parent)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::AddUserProperty { element, defn } => {
            user_property_ops::add_user_property(module, element, defn)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::DropUserProperty { element, name } => {
            user_property_ops::drop_user_property(module, element, &name)?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::Undo => {
            module.undo()?;
            Ok(CommandOutput::Done)
        }
        DesignCommand::Redo => {
            module.redo()?;
            Ok(CommandOutput::Done)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::errors::DesignError;
    use crate::model::PropertyValue;
    use crate::schema::{slots, ElementKind};

    fn create(module: &mut Module, kind: ElementKind) -> ElementId {
        apply(module, DesignCommand::CreateElement { kind })
            .unwrap()
            .element()
            .unwrap()
    }

    #[test]
    fn test_apply_add_and_undo() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let label = create(&mut module, ElementKind::Label);
        apply(
            &mut module,
            DesignCommand::AddContent {
                container: root,
                content: label,
                location: slots::BODY.into(),
                position: None,
            },
        )
        .unwrap();
        assert!(module.is_live(label));

        apply(&mut module, DesignCommand::Undo).unwrap();
        assert!(!module.is_live(label));
        apply(&mut module, DesignCommand::Redo).unwrap();
        assert!(module.is_live(label));
    }

    #[test]
    fn test_apply_failure_leaves_design_unchanged() {
        let mut module = Module::report_design().unwrap();
        let root = module.root();
        let label = create(&mut module, ElementKind::Label);
        let before = module.state_digest().unwrap();

        let err = apply(
            &mut module,
            DesignCommand::AddContent {
                container: root,
                content: label,
                location: slots::STYLES.into(),
                position: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DesignError::WrongType { .. }));
        assert_eq!(module.state_digest().unwrap(), before);
    }

    #[test]
    fn test_apply_make_unique_name_returns_name() {
        let mut module = Module::report_design().unwrap();
        let label = create(&mut module, ElementKind::Label);
        let out = apply(&mut module, DesignCommand::MakeUniqueName { element: label }).unwrap();
        assert_eq!(out, CommandOutput::Named("label1".to_string()));

        apply(
            &mut module,
            DesignCommand::SetProperty {
                element: label,
                property: "text".to_string(),
                value: Some(PropertyValue::string("hello")),
            },
        )
        .unwrap();
        assert_eq!(
            module.property(label, "text").unwrap(),
            Some(PropertyValue::string("hello"))
        );
    }
}
