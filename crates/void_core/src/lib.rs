//! # void_core - Level Editor Core Primitives
//!
//! Identity types shared by every editor crate. A [`Guid`] is the stable
//! join key between an object in the editor and its authoritative copy on
//! the host; it survives sessions and is never reused.

pub mod error;
pub mod guid;

pub use error::*;
pub use guid::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{GuidError, Result};
    pub use crate::guid::Guid;
}
