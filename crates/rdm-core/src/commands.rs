//! Command inventory for the handle layer
//!
//! Every edit a UI or script can request is one [`DesignCommand`]; the
//! [`crate::apply::apply`] entry point dispatches it to the content
//! commands and logs the boundary.

use crate::model::{ContentLocation, ElementId, PropertyValue, UserPropertyDefn};
use crate::ops::RemoveStrategy;
use crate::schema::ElementKind;

/// One design edit
#[derive(Debug, Clone, PartialEq)]
pub enum DesignCommand {
    /// Create a detached element
    CreateElement { kind: ElementKind },

    /// Attach a detached element at `position` (`None` appends)
    AddContent {
        container: ElementId,
        content: ElementId,
        location: ContentLocation,
        position: Option<usize>,
    },

    /// Remove an element and clean up what refers to it
    RemoveContent {
        content: ElementId,
        strategy: RemoveStrategy,
    },

    /// Move an element to another container or location
    MoveContent {
        content: ElementId,
        container: ElementId,
        location: ContentLocation,
        position: Option<usize>,
    },

    /// Reorder an element within its own list
    MovePosition { content: ElementId, position: usize },

    SetName {
        element: ElementId,
        name: Option<String>,
    },

    /// Rename to a name unique in the element's name space
    MakeUniqueName { element: ElementId },

    SetProperty {
        element: ElementId,
        property: String,
        value: Option<PropertyValue>,
    },

    SetStyle {
        element: ElementId,
        style: Option<ElementId>,
    },

    SetExtends {
        element: ElementId,
        parent: Option<ElementId>,
    },

    AddUserProperty {
        element: ElementId,
        defn: UserPropertyDefn,
    },

    DropUserProperty { element: ElementId, name: String },

    Undo,
    Redo,
}

impl DesignCommand {
    /// Operation name used in log lines
    pub fn op_name(&self) -> &'static str {
        match self {
            DesignCommand::CreateElement { .. } => "create_element",
            DesignCommand::AddContent { .. } => "add_content",
            DesignCommand::RemoveContent { .. } => "remove_content",
            DesignCommand::MoveContent { .. } => "move_content",
            DesignCommand::MovePosition { .. } => "move_position",
            DesignCommand::SetName { .. } => "set_name",
            DesignCommand::MakeUniqueName { .. } => "make_unique_name",
            DesignCommand::SetProperty { .. } => "set_property",
            DesignCommand::SetStyle { .. } => "set_style",
            DesignCommand::SetExtends { .. } => "set_extends",
            DesignCommand::AddUserProperty { .. } => "add_user_property",
            DesignCommand::DropUserProperty { .. } => "drop_user_property",
            DesignCommand::Undo => "undo",
            DesignCommand::Redo => "redo",
        }
    }

    /// Element the command is about, for log context
    pub fn subject(&self) -> Option<ElementId> {
        match self {
            DesignCommand::CreateElement { .. } | DesignCommand::Undo | DesignCommand::Redo => None,
            DesignCommand::AddContent { content, .. }
            | DesignCommand::RemoveContent { content, .. }
            | DesignCommand::MoveContent { content, .. }
            | DesignCommand::MovePosition { content, .. } => Some(*content),
            DesignCommand::SetName { element, .. }
            | DesignCommand::MakeUniqueName { element }
            | DesignCommand::SetProperty { element, .. }
            | DesignCommand::SetStyle { element, .. }
            | DesignCommand::SetExtends { element, .. }
            | DesignCommand::AddUserProperty { element, .. }
            | DesignCommand::DropUserProperty { element, .. } => Some(*element),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_names_are_snake_case() {
        let cmd = DesignCommand::MovePosition {
            content: ElementId::new(3),
            position: 0,
        };
        assert_eq!(cmd.op_name(), "move_position");
        assert_eq!(cmd.subject(), Some(ElementId::new(3)));
        assert_eq!(DesignCommand::Undo.subject(), None);
    }
}
