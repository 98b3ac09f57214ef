use serde_json::{Map, Value};
use void_core::Guid;

use super::table;
use super::TransferResult;

/// Where an object hangs in the host's hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameObjectParentData {
    /// Parent object, `None` for top-level objects
    pub guid: Option<Guid>,
    pub type_name: Option<String>,
    pub primary_instance_guid: Option<Guid>,
    pub partition_guid: Option<Guid>,
}

impl GameObjectParentData {
    pub fn new(parent: Guid) -> Self {
        Self {
            guid: Some(parent),
            ..Default::default()
        }
    }

    /// The parent, ignoring the host's nil guid.
    pub fn parent(&self) -> Option<Guid> {
        self.guid.filter(|g| !g.is_nil())
    }

    pub fn from_table(value: &Value) -> TransferResult<Self> {
        let t = table::as_table(value, "parentData")?;
        Ok(Self {
            guid: table::optional_guid(t, "guid")?,
            type_name: table::optional_string(t, "typeName")?,
            primary_instance_guid: table::optional_guid(t, "primaryInstanceGuid")?,
            partition_guid: table::optional_guid(t, "partitionGuid")?,
        })
    }

    pub fn to_table(&self) -> Value {
        let mut out = Map::new();
        if let Some(guid) = self.guid {
            out.insert("guid".into(), Value::from(guid.to_string()));
        }
        if let Some(type_name) = &self.type_name {
            out.insert("typeName".into(), Value::from(type_name.as_str()));
        }
        if let Some(guid) = self.primary_instance_guid {
            out.insert("primaryInstanceGuid".into(), Value::from(guid.to_string()));
        }
        if let Some(guid) = self.partition_guid {
            out.insert("partitionGuid".into(), Value::from(guid.to_string()));
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nil_parent_means_top_level() {
        let data = GameObjectParentData::from_table(&json!({
            "guid": "00000000-0000-0000-0000-000000000000",
            "typeName": "custom_root",
        }))
        .unwrap();
        assert!(data.guid.is_some());
        assert_eq!(data.parent(), None);
    }
}
