//! Core editor types and state management.
//!
//! This module contains the central [`Editor`] and the pieces it owns:
//! selection, undo history, configuration and the session collaborators.

pub mod editor_state;
mod history;
mod preferences;
mod selection;
mod session;

pub use editor_state::Editor;
pub use history::{HistoryExecutor, Transaction, UndoHistory};
pub use preferences::{ConfigError, EditorConfig, HistoryConfig, SelectionConfig};
pub use selection::{SelectOptions, SelectionGroup};
pub use session::SessionContext;
