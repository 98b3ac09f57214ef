//! Per-entity records inside a game object's blueprint.

use glam::{Mat4, Vec3};
use serde_json::{Map, Value};

use super::table;
use super::{CtrRef, TransferResult};
use crate::transform::LinearTransform;

/// Axis-aligned bounding box in the entity's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Translation that moves a unit box centred at the origin onto this box's centre.
    pub fn center_offset(&self) -> Mat4 {
        Mat4::from_translation(self.center())
    }

    pub fn from_table(value: &Value) -> TransferResult<Self> {
        let t = table::as_table(value, "aabb")?;
        let corner = |key: &str| match table::field(t, key) {
            Some(v) => table::vec3(v, key),
            None => Ok(Vec3::ZERO),
        };
        Ok(Self {
            min: corner("min")?,
            max: corner("max")?,
        })
    }

    pub fn to_table(&self) -> Value {
        let mut out = Map::new();
        out.insert("min".into(), table::vec3_to_value(self.min));
        out.insert("max".into(), table::vec3_to_value(self.max));
        Value::Object(out)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }
}

/// One entity spawned by a game object's blueprint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameEntityData {
    pub instance_id: u32,
    pub index_in_blueprint: Option<u32>,
    pub type_name: Option<String>,
    pub is_spatial: bool,
    /// Relative to the owning game object
    pub transform: Option<LinearTransform>,
    pub initiator_ref: Option<CtrRef>,
    pub aabb: Option<Aabb>,
}

impl GameEntityData {
    pub fn spatial(instance_id: u32, aabb: Aabb) -> Self {
        Self {
            instance_id,
            is_spatial: true,
            aabb: Some(aabb),
            ..Default::default()
        }
    }

    /// Decode `{instanceId, indexInBlueprint, typeName, isSpatial, transform, initiatorRef, aabb}`.
    pub fn from_table(value: &Value) -> TransferResult<Self> {
        let t = table::as_table(value, "gameEntities")?;
        let mut data = Self::default();

        if let Some(v) = table::field(t, "instanceId") {
            data.instance_id = table::u32(v, "instanceId")?;
        }
        if let Some(v) = table::field(t, "indexInBlueprint") {
            data.index_in_blueprint = Some(table::u32(v, "indexInBlueprint")?);
        }
        data.type_name = table::optional_string(t, "typeName")?;
        if let Some(v) = table::field(t, "isSpatial") {
            data.is_spatial = table::boolean(v, "isSpatial")?;
        }
        if let Some(v) = table::field(t, "transform") {
            data.transform = Some(LinearTransform::from_table(v)?);
        }
        if let Some(v) = table::field(t, "initiatorRef") {
            data.initiator_ref = Some(CtrRef::from_table(v)?);
        }
        if let Some(v) = table::field(t, "aabb") {
            data.aabb = Some(Aabb::from_table(v)?);
        }

        Ok(data)
    }

    pub fn to_table(&self) -> Value {
        let mut out = Map::new();
        out.insert("instanceId".into(), Value::from(self.instance_id));
        if let Some(index) = self.index_in_blueprint {
            out.insert("indexInBlueprint".into(), Value::from(index));
        }
        if let Some(type_name) = &self.type_name {
            out.insert("typeName".into(), Value::from(type_name.as_str()));
        }
        out.insert("isSpatial".into(), Value::from(self.is_spatial));
        if let Some(transform) = &self.transform {
            out.insert("transform".into(), transform.to_table());
        }
        if let Some(initiator) = &self.initiator_ref {
            out.insert("initiatorRef".into(), initiator.to_table());
        }
        if let Some(aabb) = &self.aabb {
            out.insert("aabb".into(), aabb.to_table());
        }
        Value::Object(out)
    }
}
