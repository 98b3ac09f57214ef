//! Blueprint references.

use serde_json::{Map, Value};
use void_core::Guid;

use super::table;
use super::TransferResult;

/// Reference to a blueprint definition (partition + instance pair).
///
/// Identifies *what kind* of thing an instance is, never *which* instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CtrRef {
    pub type_name: Option<String>,
    pub name: Option<String>,
    pub partition_guid: Option<Guid>,
    pub instance_guid: Option<Guid>,
}

impl CtrRef {
    pub fn new(partition_guid: Guid, instance_guid: Guid) -> Self {
        Self {
            partition_guid: Some(partition_guid),
            instance_guid: Some(instance_guid),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, type_name: impl Into<String>, name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self.name = Some(name.into());
        self
    }

    /// Both halves of the compound key are present.
    pub fn is_valid(&self) -> bool {
        self.partition_guid.is_some() && self.instance_guid.is_some()
    }

    /// Decode `{typeName, name, partitionGuid, instanceGuid}`.
    pub fn from_table(value: &Value) -> TransferResult<Self> {
        let t = table::as_table(value, "ctrRef")?;
        Ok(Self {
            type_name: table::optional_string(t, "typeName")?,
            name: table::optional_string(t, "name")?,
            partition_guid: table::optional_guid(t, "partitionGuid")?,
            instance_guid: table::optional_guid(t, "instanceGuid")?,
        })
    }

    pub fn to_table(&self) -> Value {
        let mut out = Map::new();
        if let Some(type_name) = &self.type_name {
            out.insert("typeName".into(), Value::from(type_name.as_str()));
        }
        if let Some(name) = &self.name {
            out.insert("name".into(), Value::from(name.as_str()));
        }
        if let Some(guid) = self.partition_guid {
            out.insert("partitionGuid".into(), Value::from(guid.to_string()));
        }
        if let Some(guid) = self.instance_guid {
            out.insert("instanceGuid".into(), Value::from(guid.to_string()));
        }
        Value::Object(out)
    }
}
