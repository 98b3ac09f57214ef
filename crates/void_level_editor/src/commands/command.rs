//! Command trait and result types.

use thiserror::Error;
use void_core::Guid;

use super::channel::CommandChannel;
use crate::transfer::GameObjectTransferData;

/// Result type for command execution.
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur while issuing commands.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CommandError {
    /// No descriptor is registered under this tag
    #[error("unknown command kind `{0}`")]
    UnknownKind(String),

    /// The transport to the host is gone
    #[error("command channel is closed")]
    ChannelClosed,

    #[error("game object {0} not found")]
    ObjectNotFound(Guid),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// A reversible edit proposed to the host.
///
/// Commands never touch local scene state. `execute` sends the forward
/// operation through the channel and `undo` sends its semantic inverse;
/// the scene converges once the host reports back.
pub trait Command {
    /// Tag of the forward operation, as the host knows it.
    fn kind(&self) -> &str;

    /// Human-readable description for the undo/redo menu.
    fn description(&self) -> &str;

    fn execute(&mut self, channel: &mut dyn CommandChannel) -> CommandResult;

    fn undo(&mut self, channel: &mut dyn CommandChannel) -> CommandResult;

    /// Payload of the forward operation, if this is a leaf command.
    fn payload(&self) -> Option<&GameObjectTransferData> {
        None
    }

    /// Children of a composite command, in execution order.
    fn sub_commands(&self) -> &[Box<dyn Command>] {
        &[]
    }
}

impl std::fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("kind", &self.kind())
            .field("description", &self.description())
            .field("children", &self.sub_commands().len())
            .finish()
    }
}

/// Where finished commands are handed for execution and bookkeeping.
pub trait CommandExecutor {
    fn submit(&mut self, command: Box<dyn Command>) -> CommandResult;
}

/// Collects commands without running them.
impl CommandExecutor for Vec<Box<dyn Command>> {
    fn submit(&mut self, command: Box<dyn Command>) -> CommandResult {
        self.push(command);
        Ok(())
    }
}
