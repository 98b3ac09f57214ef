//! Placed objects of the level.

use glam::Mat4;
use void_core::Guid;

use super::instances::{Color, InstanceRegistry};
use super::spatial_entity::SpatialGameEntity;
use crate::transfer::{
    CtrRef, GameObjectOrigin, GameObjectParentData, GameObjectTransferData, Realm,
};
use crate::transform::LinearTransform;

/// What a scene node is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A placed blueprint instance
    #[default]
    GameObject,
    /// Organizational container. Never selected as a parent.
    Layer,
}

/// A node of the scene graph.
///
/// The transform is local to the parent. `committed` is the last pose the
/// host confirmed; the difference between the two is an uncommitted drag.
#[derive(Clone, Debug)]
pub struct GameObject {
    guid: Guid,
    pub name: String,
    kind: NodeKind,
    pub blueprint: Option<CtrRef>,
    pub original_ref: Option<CtrRef>,
    pub parent_data: Option<GameObjectParentData>,
    pub variation: Option<u32>,
    pub origin: Option<GameObjectOrigin>,
    pub realm: Option<Realm>,
    pub enabled: bool,
    pub user_modified: bool,

    pub(super) transform: LinearTransform,
    pub(super) committed: LinearTransform,
    pub(super) parent: Option<Guid>,
    pub(super) children: Vec<Guid>,

    selected: bool,
    highlighted: bool,
    pub(super) visible: bool,
    pub(super) revealed: bool,

    entities: Vec<SpatialGameEntity>,
}

impl GameObject {
    pub fn new(guid: Guid, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
            kind: NodeKind::GameObject,
            blueprint: None,
            original_ref: None,
            parent_data: None,
            variation: None,
            origin: None,
            realm: None,
            enabled: true,
            user_modified: false,
            transform: LinearTransform::IDENTITY,
            committed: LinearTransform::IDENTITY,
            parent: None,
            children: Vec::new(),
            selected: false,
            highlighted: false,
            visible: true,
            revealed: false,
            entities: Vec::new(),
        }
    }

    pub fn layer(guid: Guid, name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Layer,
            ..Self::new(guid, name)
        }
    }

    pub fn with_transform(mut self, transform: LinearTransform) -> Self {
        self.transform = transform;
        self.committed = transform;
        self
    }

    /// Build an object from a host record. Returns `None` without a guid.
    pub fn from_transfer_data(data: &GameObjectTransferData) -> Option<Self> {
        let guid = data.guid?;
        let name = data.name.clone().unwrap_or_else(|| guid.to_string());
        let mut object = Self::new(guid, name).with_transform(data.transform.unwrap_or_default());

        object.blueprint = data.blueprint_ctr_ref.clone();
        object.original_ref = data.original_ref.clone();
        object.parent_data = data.parent_data.clone();
        object.variation = data.variation;
        object.origin = data.origin;
        object.realm = data.realm;
        object.enabled = data.is_enabled.unwrap_or(true);
        object.user_modified = data.is_user_modified.unwrap_or(false);

        if let Some(entities) = &data.game_entities {
            object.entities = entities
                .iter()
                .filter_map(|e| SpatialGameEntity::from_data(guid, e))
                .collect();
        }
        Some(object)
    }

    /// Full snapshot of this object.
    ///
    /// `transform` is the committed pose in the parent's space; the host
    /// works in world space, see [`SceneGraph::snapshot`](super::SceneGraph::snapshot).
    pub fn to_transfer_data(&self) -> GameObjectTransferData {
        GameObjectTransferData {
            guid: Some(self.guid),
            name: Some(self.name.clone()),
            parent_data: self.parent_data.clone(),
            blueprint_ctr_ref: self.blueprint.clone(),
            transform: Some(self.committed),
            variation: self.variation,
            is_enabled: Some(self.enabled),
            is_user_modified: Some(self.user_modified),
            origin: self.origin,
            realm: self.realm,
            original_ref: self.original_ref.clone(),
            ..Default::default()
        }
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_game_object(&self) -> bool {
        self.kind == NodeKind::GameObject
    }

    /// Live local transform.
    pub fn transform(&self) -> &LinearTransform {
        &self.transform
    }

    /// Last local transform confirmed by the host.
    pub fn committed_transform(&self) -> &LinearTransform {
        &self.committed
    }

    pub fn parent(&self) -> Option<Guid> {
        self.parent
    }

    pub fn children(&self) -> &[Guid] {
        &self.children
    }

    /// Directly selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Shown either by the user or because a selected descendant needs it.
    pub fn is_visible(&self) -> bool {
        self.visible || self.revealed
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn entities(&self) -> &[SpatialGameEntity] {
        &self.entities
    }

    /// True when the live pose drifted from the committed one by more than `epsilon`.
    pub fn has_moved(&self, epsilon: f32) -> bool {
        !self.transform.approx_eq(&self.committed, epsilon)
    }

    pub fn on_select(&mut self, registry: &mut dyn InstanceRegistry, color: Color) {
        self.selected = true;
        for entity in &mut self.entities {
            entity.on_select(registry, color);
        }
    }

    pub fn on_deselect(&mut self, registry: &mut dyn InstanceRegistry) {
        self.selected = false;
        for entity in &mut self.entities {
            entity.on_deselect(registry);
        }
    }

    pub fn on_highlight(&mut self, registry: &mut dyn InstanceRegistry, color: Color) {
        self.highlighted = true;
        for entity in &mut self.entities {
            entity.on_highlight(registry, color);
        }
    }

    pub fn on_unhighlight(&mut self, registry: &mut dyn InstanceRegistry) {
        self.highlighted = false;
        for entity in &mut self.entities {
            entity.on_unhighlight(registry);
        }
    }

    pub fn set_color(&self, registry: &mut dyn InstanceRegistry, color: Color) {
        for entity in &self.entities {
            entity.set_color(registry, color);
        }
    }

    pub fn register_entities(&self, registry: &mut dyn InstanceRegistry, world: &Mat4) {
        for entity in &self.entities {
            entity.register(registry, world);
        }
    }

    pub fn update_entity_matrices(&self, registry: &mut dyn InstanceRegistry, world: &Mat4) {
        for entity in &self.entities {
            entity.update_matrix(registry, world);
        }
    }

    pub fn delete_entities(&self, registry: &mut dyn InstanceRegistry) {
        for entity in &self.entities {
            entity.delete(registry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{Aabb, GameEntityData};
    use glam::Vec3;

    #[test]
    fn test_from_transfer_data() {
        let guid = Guid::new_v4();
        let data = GameObjectTransferData::builder()
            .guid(guid)
            .name("crate_01")
            .transform(LinearTransform::from_translation(Vec3::new(1.0, 2.0, 3.0)))
            .enabled(false)
            .game_entities(vec![
                GameEntityData::spatial(0, Aabb::default()),
                GameEntityData {
                    instance_id: 1,
                    ..Default::default()
                },
            ])
            .build()
            .unwrap();

        let object = GameObject::from_transfer_data(&data).unwrap();
        assert_eq!(object.guid(), guid);
        assert_eq!(object.name, "crate_01");
        assert!(!object.enabled);
        assert_eq!(object.entities().len(), 1);
        assert!(!object.has_moved(1e-4));
    }

    #[test]
    fn test_missing_guid_yields_nothing() {
        let data = GameObjectTransferData {
            name: Some("orphan".into()),
            ..Default::default()
        };
        assert!(GameObject::from_transfer_data(&data).is_none());
    }

    #[test]
    fn test_has_moved_uses_committed_pose() {
        let mut object = GameObject::new(Guid::new_v4(), "a");
        assert!(!object.has_moved(1e-4));

        object.transform = LinearTransform::from_translation(Vec3::new(0.5, 0.0, 0.0));
        assert!(object.has_moved(1e-4));

        let snapshot = object.to_transfer_data();
        assert_eq!(snapshot.transform, Some(LinearTransform::IDENTITY));
    }

    #[test]
    fn test_layer_kind() {
        let layer = GameObject::layer(Guid::new_v4(), "Layer 1");
        assert_eq!(layer.kind(), NodeKind::Layer);
        assert!(!layer.is_game_object());
    }
}
