//! Notifications published on the session's event bus.

use void_core::Guid;

use crate::transform::LinearTransform;

/// An object joined the selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameObjectSelected {
    pub guid: Guid,
    pub multi_select: bool,
    /// The outliner should scroll the object into view
    pub scroll_to: bool,
}

/// An object left the selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameObjectDeselected {
    pub guid: Guid,
}

/// Which property of an object changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectField {
    Transform,
}

/// An object's property changed locally.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectChanged {
    pub guid: Guid,
    pub field: ObjectField,
    /// New local transform
    pub transform: LinearTransform,
}

/// Which property of the selection group changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupField {
    Transform,
}

/// The selection group's pivot moved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionGroupChanged {
    pub field: GroupField,
    pub transform: LinearTransform,
}
