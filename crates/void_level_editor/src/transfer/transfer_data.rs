use serde_json::{Map, Value};
use void_core::Guid;

use super::table;
use super::{
    CtrRef, GameEntityData, GameObjectOrigin, GameObjectParentData, Realm, TransferDataError,
    TransferResult,
};
use crate::transform::LinearTransform;

/// One field-level override applied on top of a blueprint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldOverride {
    /// Path of the field inside the blueprint, outermost first
    pub field: Vec<String>,
    pub type_name: Option<String>,
    pub value: Value,
}

impl FieldOverride {
    pub fn new(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into().split('.').map(str::to_string).collect(),
            type_name: None,
            value,
        }
    }

    /// Decode `{field, type, value}`; `field` is a dotted path or a list of segments.
    pub fn from_table(value: &Value) -> TransferResult<Self> {
        let t = table::as_table(value, "overrides")?;
        let field = match table::field(t, "field") {
            Some(Value::String(path)) => path.split('.').map(str::to_string).collect(),
            Some(list) => table::list(list, "field")?
                .into_iter()
                .map(|segment| table::string(segment, "field"))
                .collect::<TransferResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(Self {
            field,
            type_name: table::optional_string(t, "type")?,
            value: t.get("value").cloned().unwrap_or(Value::Null),
        })
    }

    pub fn to_table(&self) -> Value {
        let mut out = Map::new();
        out.insert("field".into(), Value::from(self.field.join(".")));
        if let Some(type_name) = &self.type_name {
            out.insert("type".into(), Value::from(type_name.as_str()));
        }
        out.insert("value".into(), self.value.clone());
        Value::Object(out)
    }
}

/// Sparse description of a change to one game object.
///
/// `None` means "leave unchanged". `name` is informational and never
/// authoritative.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameObjectTransferData {
    pub guid: Option<Guid>,
    pub name: Option<String>,
    pub parent_data: Option<GameObjectParentData>,
    pub blueprint_ctr_ref: Option<CtrRef>,
    pub transform: Option<LinearTransform>,
    pub variation: Option<u32>,
    pub game_entities: Option<Vec<GameEntityData>>,
    pub is_deleted: Option<bool>,
    pub is_enabled: Option<bool>,
    pub is_user_modified: Option<bool>,
    pub origin: Option<GameObjectOrigin>,
    pub realm: Option<Realm>,
    pub original_ref: Option<CtrRef>,
    pub overrides: Option<Vec<FieldOverride>>,
    /// Keys without a decode rule, kept verbatim
    pub extra: Map<String, Value>,
}

impl GameObjectTransferData {
    /// A record that only names its object.
    pub fn new(guid: Guid) -> Self {
        Self {
            guid: Some(guid),
            ..Default::default()
        }
    }

    pub fn builder() -> TransferDataBuilder {
        TransferDataBuilder::default()
    }

    /// True when no field at all is populated, the guid included.
    pub fn is_empty(&self) -> bool {
        self.guid.is_none() && !self.has_changes()
    }

    /// True when any field besides the guid is populated.
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.parent_data.is_some()
            || self.blueprint_ctr_ref.is_some()
            || self.transform.is_some()
            || self.variation.is_some()
            || self.game_entities.is_some()
            || self.is_deleted.is_some()
            || self.is_enabled.is_some()
            || self.is_user_modified.is_some()
            || self.origin.is_some()
            || self.realm.is_some()
            || self.original_ref.is_some()
            || self.overrides.is_some()
            || !self.extra.is_empty()
    }

    /// Decode a raw keyed record.
    ///
    /// Each recognized key goes through its decode rule; other keys are kept
    /// in `extra`. A record without `guid` is still decoded in full and
    /// handed back inside [`TransferDataError::MissingGuid`].
    pub fn from_table(value: &Value) -> TransferResult<Self> {
        let t = table::as_table(value, "GameObjectTransferData")?;
        let mut data = Self::default();

        for (key, value) in t {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "guid" => data.guid = Some(table::guid(value, key)?),
                "name" => data.name = Some(table::string(value, key)?),
                "parentData" => data.parent_data = Some(GameObjectParentData::from_table(value)?),
                "blueprintCtrRef" => data.blueprint_ctr_ref = Some(CtrRef::from_table(value)?),
                "originalRef" => data.original_ref = Some(CtrRef::from_table(value)?),
                "transform" => data.transform = Some(LinearTransform::from_table(value)?),
                "variation" => data.variation = Some(table::u32(value, key)?),
                "gameEntities" => {
                    let entities = table::list(value, key)?
                        .into_iter()
                        .map(GameEntityData::from_table)
                        .collect::<TransferResult<Vec<_>>>()?;
                    data.game_entities = Some(entities);
                }
                "isDeleted" => data.is_deleted = Some(table::boolean(value, key)?),
                "isEnabled" => data.is_enabled = Some(table::boolean(value, key)?),
                "isUserModified" => data.is_user_modified = Some(table::boolean(value, key)?),
                "origin" => data.origin = Some(GameObjectOrigin::from_value(value, key)?),
                "realm" => data.realm = Some(Realm::from_value(value, key)?),
                "overrides" => {
                    let overrides = table::list(value, key)?
                        .into_iter()
                        .map(FieldOverride::from_table)
                        .collect::<TransferResult<Vec<_>>>()?;
                    data.overrides = Some(overrides);
                }
                _ => {
                    data.extra.insert(key.clone(), value.clone());
                }
            }
        }

        if data.guid.is_none() {
            log::warn!("Attempted to create a GameObjectTransferData without a specified guid");
            return Err(TransferDataError::MissingGuid {
                partial: Box::new(data),
            });
        }
        Ok(data)
    }

    /// Encode the populated fields as a keyed record.
    pub fn to_table(&self) -> Value {
        let mut out = self.extra.clone();
        if let Some(guid) = self.guid {
            out.insert("guid".into(), Value::from(guid.to_string()));
        }
        if let Some(name) = &self.name {
            out.insert("name".into(), Value::from(name.as_str()));
        }
        if let Some(parent) = &self.parent_data {
            out.insert("parentData".into(), parent.to_table());
        }
        if let Some(r) = &self.blueprint_ctr_ref {
            out.insert("blueprintCtrRef".into(), r.to_table());
        }
        if let Some(r) = &self.original_ref {
            out.insert("originalRef".into(), r.to_table());
        }
        if let Some(transform) = &self.transform {
            out.insert("transform".into(), transform.to_table());
        }
        if let Some(variation) = self.variation {
            out.insert("variation".into(), Value::from(variation));
        }
        if let Some(entities) = &self.game_entities {
            out.insert(
                "gameEntities".into(),
                Value::Array(entities.iter().map(GameEntityData::to_table).collect()),
            );
        }
        if let Some(flag) = self.is_deleted {
            out.insert("isDeleted".into(), Value::from(flag));
        }
        if let Some(flag) = self.is_enabled {
            out.insert("isEnabled".into(), Value::from(flag));
        }
        if let Some(flag) = self.is_user_modified {
            out.insert("isUserModified".into(), Value::from(flag));
        }
        if let Some(origin) = self.origin {
            out.insert("origin".into(), Value::from(origin as u8));
        }
        if let Some(realm) = self.realm {
            out.insert("realm".into(), Value::from(realm as u8));
        }
        if let Some(overrides) = &self.overrides {
            out.insert(
                "overrides".into(),
                Value::Array(overrides.iter().map(FieldOverride::to_table).collect()),
            );
        }
        Value::Object(out)
    }
}

/// Typed argument bag for [`GameObjectTransferData`].
#[derive(Clone, Debug, Default)]
pub struct TransferDataBuilder {
    data: GameObjectTransferData,
}

impl TransferDataBuilder {
    pub fn guid(mut self, guid: Guid) -> Self {
        self.data.guid = Some(guid);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.data.name = Some(name.into());
        self
    }

    pub fn parent_data(mut self, parent: GameObjectParentData) -> Self {
        self.data.parent_data = Some(parent);
        self
    }

    pub fn blueprint(mut self, blueprint: CtrRef) -> Self {
        self.data.blueprint_ctr_ref = Some(blueprint);
        self
    }

    pub fn original_ref(mut self, original: CtrRef) -> Self {
        self.data.original_ref = Some(original);
        self
    }

    pub fn transform(mut self, transform: LinearTransform) -> Self {
        self.data.transform = Some(transform);
        self
    }

    pub fn variation(mut self, variation: u32) -> Self {
        self.data.variation = Some(variation);
        self
    }

    pub fn game_entities(mut self, entities: Vec<GameEntityData>) -> Self {
        self.data.game_entities = Some(entities);
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.data.is_deleted = Some(deleted);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.data.is_enabled = Some(enabled);
        self
    }

    pub fn user_modified(mut self, modified: bool) -> Self {
        self.data.is_user_modified = Some(modified);
        self
    }

    pub fn origin(mut self, origin: GameObjectOrigin) -> Self {
        self.data.origin = Some(origin);
        self
    }

    pub fn realm(mut self, realm: Realm) -> Self {
        self.data.realm = Some(realm);
        self
    }

    pub fn overrides(mut self, overrides: Vec<FieldOverride>) -> Self {
        self.data.overrides = Some(overrides);
        self
    }

    /// Finish the record. A populated bag without a guid is a usage error.
    pub fn build(self) -> TransferResult<GameObjectTransferData> {
        if self.data.guid.is_none() && self.data.has_changes() {
            log::warn!("Attempted to create a GameObjectTransferData without a specified guid");
            return Err(TransferDataError::MissingGuid {
                partial: Box::new(self.data),
            });
        }
        Ok(self.data)
    }
}
