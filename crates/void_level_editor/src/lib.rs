//! Void Level Editor Core
//!
//! Selection and command core of a level editor whose scene lives in an
//! external host. The editor keeps a local mirror of the level, lets the
//! user select objects and move them as one group, and turns every edit
//! into a reversible command sent to the host.
//!
//! ## Features
//!
//! - **Selection Group**: multi-select with a virtual pivot that moves
//!   differently-parented objects as one rigid assembly
//! - **Commands**: forward/inverse host operations from a registry of kinds
//! - **Undo/Redo**: history with bulk commands and transactions
//! - **Transfer Data**: sparse edit records decoded from raw host tables
//!
//! ## Architecture
//!
//! ```text
//! User Input → SelectionGroup → Command → CommandChannel → Host
//!                                               Host → apply_host_update → SceneGraph
//! ```
//!
//! Commands never mutate the local scene; it converges when the host reports back.

pub mod commands;
pub mod core;
pub mod events;
pub mod scene;
pub mod transfer;
pub mod transform;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, Editor, EditorConfig, HistoryExecutor, SelectOptions, SelectionGroup,
    SessionContext, UndoHistory,
};

pub use commands::{
    BulkCommand, Command, CommandChannel, CommandError, CommandExecutor, CommandRegistry,
    CommandResult, HostCommand, ObjectCommand, OutgoingQueue,
};

pub use events::{
    GameObjectDeselected, GameObjectSelected, GroupField, ObjectChanged, ObjectField,
    SelectionGroupChanged,
};

pub use scene::{GameObject, InstanceRegistry, InstanceTable, SceneError, SceneGraph};
pub use transfer::{GameObjectTransferData, TransferDataError};
pub use transform::LinearTransform;

/// Editor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Editor name
pub const NAME: &str = "Void Level Editor";
