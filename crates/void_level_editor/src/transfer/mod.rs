//! Sparse edit payloads exchanged with the host.
//!
//! A [`GameObjectTransferData`] describes a proposed or confirmed change to
//! one object. Only populated fields mean "change this"; absent fields mean
//! "leave unchanged". Records arrive either from typed code (the builder) or
//! as raw keyed tables from the data-import layer (`from_table`).

mod ctr_ref;
mod entity_data;
mod enums;
mod parent_data;
pub(crate) mod table;
mod transfer_data;

pub use ctr_ref::CtrRef;
pub use entity_data::{Aabb, GameEntityData};
pub use enums::{GameObjectOrigin, Realm};
pub use parent_data::GameObjectParentData;
pub use transfer_data::{FieldOverride, GameObjectTransferData, TransferDataBuilder};

use thiserror::Error;
use void_core::GuidError;

/// Errors raised while building or decoding transfer data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransferDataError {
    /// The raw record is not a keyed table
    #[error("expected a keyed table for `{0}`")]
    NotATable(String),

    /// A populated record carries no guid.
    ///
    /// The rest of the record was decoded; callers may proceed with it via
    /// [`TransferDataError::into_partial`].
    #[error("attempted to create a GameObjectTransferData without a specified guid")]
    MissingGuid { partial: Box<GameObjectTransferData> },

    /// The guid key holds something that is not a guid
    #[error("invalid guid in `{key}`: {source}")]
    InvalidGuid {
        key: String,
        #[source]
        source: GuidError,
    },

    /// A recognized key holds a value of the wrong shape
    #[error("field `{key}` has the wrong shape, expected {expected}")]
    InvalidField { key: String, expected: &'static str },
}

impl TransferDataError {
    /// Recover the partially built record from a missing-guid error.
    pub fn into_partial(self) -> Option<GameObjectTransferData> {
        match self {
            TransferDataError::MissingGuid { partial } => Some(*partial),
            _ => None,
        }
    }
}

/// Result type for transfer data decoding
pub type TransferResult<T> = Result<T, TransferDataError>;
