//! Visual instance registry contract.
//!
//! The renderer draws one box instance per spatial entity. The editor never
//! talks to the renderer directly; it goes through [`InstanceRegistry`],
//! keyed by the entity's own identity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Mat4;
use void_core::Guid;

/// RGB colour in `0.0..=1.0`.
pub type Color = [f32; 3];

/// Identity of one spatial entity: its owning game object plus the
/// instance id the host assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    pub owner: Guid,
    pub instance_id: u32,
}

impl EntityHandle {
    pub fn new(owner: Guid, instance_id: u32) -> Self {
        Self { owner, instance_id }
    }
}

impl std::fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.owner, self.instance_id)
    }
}

/// Renderer-side store of entity instances.
pub trait InstanceRegistry {
    /// Register an entity with its initial world matrix.
    fn add(&mut self, entity: EntityHandle, matrix: Mat4);

    /// Drop an entity. Removing an unknown entity does nothing.
    fn remove(&mut self, entity: EntityHandle);

    fn set_visible(&mut self, entity: EntityHandle, visible: bool);

    fn set_color(&mut self, entity: EntityHandle, color: Color);

    fn set_matrix(&mut self, entity: EntityHandle, matrix: Mat4);
}

/// State the registry keeps per instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceState {
    pub matrix: Mat4,
    pub color: Color,
    pub visible: bool,
}

impl Default for InstanceState {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            color: [1.0, 1.0, 1.0],
            visible: false,
        }
    }
}

/// In-memory [`InstanceRegistry`].
///
/// Clones share the same table, so a caller can hand one clone to the
/// editor and keep another to inspect what the renderer would draw.
#[derive(Clone, Debug, Default)]
pub struct InstanceTable {
    instances: Rc<RefCell<HashMap<EntityHandle, InstanceState>>>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: EntityHandle) -> Option<InstanceState> {
        self.instances.borrow().get(&entity).copied()
    }

    pub fn contains(&self, entity: EntityHandle) -> bool {
        self.instances.borrow().contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.instances.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.borrow().is_empty()
    }

    /// Number of instances currently drawn.
    pub fn visible_count(&self) -> usize {
        self.instances.borrow().values().filter(|s| s.visible).count()
    }

    fn update(&self, entity: EntityHandle, f: impl FnOnce(&mut InstanceState)) {
        match self.instances.borrow_mut().get_mut(&entity) {
            Some(state) => f(state),
            None => log::trace!("ignoring update for unregistered instance {}", entity),
        }
    }
}

impl InstanceRegistry for InstanceTable {
    fn add(&mut self, entity: EntityHandle, matrix: Mat4) {
        self.instances.borrow_mut().insert(
            entity,
            InstanceState {
                matrix,
                ..Default::default()
            },
        );
    }

    fn remove(&mut self, entity: EntityHandle) {
        self.instances.borrow_mut().remove(&entity);
    }

    fn set_visible(&mut self, entity: EntityHandle, visible: bool) {
        self.update(entity, |s| s.visible = visible);
    }

    fn set_color(&mut self, entity: EntityHandle, color: Color) {
        self.update(entity, |s| s.color = color);
    }

    fn set_matrix(&mut self, entity: EntityHandle, matrix: Mat4) {
        self.update(entity, |s| s.matrix = matrix);
    }
}
