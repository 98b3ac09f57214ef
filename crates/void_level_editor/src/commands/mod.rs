//! Command pattern implementation for undo/redo support.
//!
//! Every edit the user makes goes to the host as a command. Commands are
//! reversible: undo sends the semantic inverse through the same channel.

mod bulk;
mod channel;
mod command;
mod object_command;
pub mod registry;

pub use bulk::{submit_batch, BulkCommand};
pub use channel::{CommandChannel, HostCommand, OutgoingQueue};
pub use command::{Command, CommandError, CommandExecutor, CommandResult};
pub use object_command::ObjectCommand;
pub use registry::{kinds, CommandDescriptor, CommandRegistry, ObjectEdit, Step};

