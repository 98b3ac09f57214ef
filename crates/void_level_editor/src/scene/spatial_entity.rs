//! Spatial entities drawn as bounding-box instances.

use glam::{Mat4, Vec3};
use void_core::Guid;

use super::instances::{Color, EntityHandle, InstanceRegistry};
use crate::transfer::{Aabb, CtrRef, GameEntityData};
use crate::transform::LinearTransform;

/// One spatial entity of a game object's blueprint.
///
/// Owned by its [`GameObject`](super::GameObject); its world pose is always
/// derived from the owner's world matrix, never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialGameEntity {
    handle: EntityHandle,
    pub initiator_ref: Option<CtrRef>,
    /// Relative to the owning game object
    transform: LinearTransform,
    aabb_scale: Vec3,
    aabb_offset: Mat4,
    visible: bool,
}

impl SpatialGameEntity {
    pub fn new(owner: Guid, instance_id: u32, transform: LinearTransform, aabb: Aabb) -> Self {
        Self {
            handle: EntityHandle::new(owner, instance_id),
            initiator_ref: None,
            transform,
            aabb_scale: aabb.size(),
            aabb_offset: aabb.center_offset(),
            visible: false,
        }
    }

    /// Build from host data. Non-spatial entities have nothing to draw.
    pub fn from_data(owner: Guid, data: &GameEntityData) -> Option<Self> {
        if !data.is_spatial {
            return None;
        }
        let mut entity = Self::new(
            owner,
            data.instance_id,
            data.transform.unwrap_or_default(),
            data.aabb.unwrap_or_default(),
        );
        entity.initiator_ref = data.initiator_ref.clone();
        Some(entity)
    }

    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    pub fn instance_id(&self) -> u32 {
        self.handle.instance_id
    }

    pub fn transform(&self) -> &LinearTransform {
        &self.transform
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Matrix of the drawn box: owner world, entity offset, then the unit
    /// box moved to the AABB centre and stretched to its size.
    pub fn instance_matrix(&self, owner_world: &Mat4) -> Mat4 {
        *owner_world * self.transform.to_matrix() * self.aabb_offset * Mat4::from_scale(self.aabb_scale)
    }

    pub fn register(&self, registry: &mut dyn InstanceRegistry, owner_world: &Mat4) {
        registry.add(self.handle, self.instance_matrix(owner_world));
        registry.set_visible(self.handle, self.visible);
    }

    pub fn on_select(&mut self, registry: &mut dyn InstanceRegistry, color: Color) {
        self.show(registry, color);
    }

    pub fn on_deselect(&mut self, registry: &mut dyn InstanceRegistry) {
        self.hide(registry);
    }

    pub fn on_highlight(&mut self, registry: &mut dyn InstanceRegistry, color: Color) {
        self.show(registry, color);
    }

    pub fn on_unhighlight(&mut self, registry: &mut dyn InstanceRegistry) {
        self.hide(registry);
    }

    pub fn set_color(&self, registry: &mut dyn InstanceRegistry, color: Color) {
        registry.set_color(self.handle, color);
    }

    pub fn update_matrix(&self, registry: &mut dyn InstanceRegistry, owner_world: &Mat4) {
        registry.set_matrix(self.handle, self.instance_matrix(owner_world));
    }

    pub fn delete(&self, registry: &mut dyn InstanceRegistry) {
        registry.remove(self.handle);
    }

    fn show(&mut self, registry: &mut dyn InstanceRegistry, color: Color) {
        self.visible = true;
        registry.set_visible(self.handle, true);
        registry.set_color(self.handle, color);
    }

    fn hide(&mut self, registry: &mut dyn InstanceRegistry) {
        self.visible = false;
        registry.set_visible(self.handle, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::InstanceTable;

    #[test]
    fn test_instance_matrix_composes_box() {
        let owner = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0));
        let entity = SpatialGameEntity::new(
            Guid::new_v4(),
            1,
            LinearTransform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            aabb,
        );

        let m = entity.instance_matrix(&owner);
        let (scale, _, translation) = m.to_scale_rotation_translation();
        assert!(scale.abs_diff_eq(Vec3::new(2.0, 4.0, 6.0), 1e-5));
        assert!(translation.abs_diff_eq(Vec3::new(11.0, 3.0, 3.0), 1e-5));
    }

    #[test]
    fn test_non_spatial_data_is_skipped() {
        let data = GameEntityData {
            instance_id: 4,
            ..Default::default()
        };
        assert!(SpatialGameEntity::from_data(Guid::new_v4(), &data).is_none());

        let spatial = GameEntityData::spatial(4, Aabb::default());
        let entity = SpatialGameEntity::from_data(Guid::new_v4(), &spatial).unwrap();
        assert_eq!(entity.instance_id(), 4);
    }

    #[test]
    fn test_select_hooks_drive_registry() {
        let table = InstanceTable::new();
        let mut registry = table.clone();
        let mut entity = SpatialGameEntity::new(Guid::new_v4(), 0, LinearTransform::IDENTITY, Aabb::default());

        entity.register(&mut registry, &Mat4::IDENTITY);
        assert!(!table.get(entity.handle()).unwrap().visible);

        entity.on_select(&mut registry, [1.0, 0.0, 0.0]);
        let state = table.get(entity.handle()).unwrap();
        assert!(state.visible);
        assert_eq!(state.color, [1.0, 0.0, 0.0]);

        entity.on_deselect(&mut registry);
        assert!(!table.get(entity.handle()).unwrap().visible);
        assert!(!entity.is_visible());

        entity.delete(&mut registry);
        entity.delete(&mut registry);
        assert!(table.is_empty());
    }
}
