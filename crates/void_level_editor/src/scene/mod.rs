//! Local mirror of the level: game objects, their hierarchy and the
//! spatial entities the renderer draws for them.

mod game_object;
mod graph;
mod instances;
mod spatial_entity;

pub use game_object::{GameObject, NodeKind};
pub use graph::SceneGraph;
pub use instances::{Color, EntityHandle, InstanceRegistry, InstanceState, InstanceTable};
pub use spatial_entity::SpatialGameEntity;

use thiserror::Error;
use void_core::Guid;

/// Errors raised by scene graph operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SceneError {
    #[error("game object {0} not found")]
    ObjectNotFound(Guid),

    #[error("game object {0} already exists")]
    DuplicateObject(Guid),

    #[error("parent {0} not found")]
    ParentNotFound(Guid),

    /// The new parent sits below the object being moved
    #[error("reparenting {0} would create a cycle")]
    CycleDetected(Guid),

    #[error("world matrix of {0} cannot be inverted")]
    SingularMatrix(Guid),

    /// Host record without an identifier
    #[error("game object record has no guid")]
    MissingGuid,
}

pub type SceneResult<T> = Result<T, SceneError>;
