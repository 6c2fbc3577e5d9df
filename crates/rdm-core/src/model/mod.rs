//! Design tree: elements, values, name spaces and the reverse reference index

pub mod back_ref;
pub mod element;
pub mod name_space;
pub mod state;
pub mod value;

pub use back_ref::{BackRef, BackRefIndex, EXTENDS_PROP, STYLE_PROP};
pub use element::{ContainerContext, ContentLocation, DesignElement, ElementId, UserPropertyDefn};
pub use name_space::{NameSpace, NameSpaces};
pub use state::DesignState;
pub use value::{ElementRefValue, PropertyValue};
