//! Host-side classification enums.

use serde_json::Value;

use super::table;
use super::{TransferDataError, TransferResult};

/// Where an object came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GameObjectOrigin {
    /// Shipped with the level
    Vanilla = 1,
    /// Placed in the editor
    Custom = 2,
    /// Spawned as part of a custom object's blueprint
    CustomChild = 3,
}

impl GameObjectOrigin {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Vanilla),
            2 => Some(Self::Custom),
            3 => Some(Self::CustomChild),
            _ => None,
        }
    }

    pub(crate) fn from_value(value: &Value, key: &str) -> TransferResult<Self> {
        Self::from_i64(table::i64(value, key)?).ok_or_else(|| TransferDataError::InvalidField {
            key: key.to_string(),
            expected: "an origin (1-3)",
        })
    }
}

/// Which side of the simulation owns an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Realm {
    Client = 0,
    Server = 1,
    ClientAndServer = 2,
}

impl Realm {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Client),
            1 => Some(Self::Server),
            2 => Some(Self::ClientAndServer),
            _ => None,
        }
    }

    pub(crate) fn from_value(value: &Value, key: &str) -> TransferResult<Self> {
        Self::from_i64(table::i64(value, key)?).ok_or_else(|| TransferDataError::InvalidField {
            key: key.to_string(),
            expected: "a realm (0-2)",
        })
    }
}
