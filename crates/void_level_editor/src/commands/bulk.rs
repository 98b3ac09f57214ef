//! Composite command that runs as one undo step.

use super::channel::CommandChannel;
use super::command::{Command, CommandResult};

/// Runs its children in order; undoes them in reverse order.
#[derive(Debug)]
pub struct BulkCommand {
    label: String,
    commands: Vec<Box<dyn Command>>,
}

impl BulkCommand {
    pub const KIND: &'static str = "BulkCommand";

    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            label: "Bulk Command".to_string(),
            commands,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_inner(self) -> Vec<Box<dyn Command>> {
        self.commands
    }
}

impl Command for BulkCommand {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn description(&self) -> &str {
        &self.label
    }

    /// On a failing child, the children already sent are undone again so
    /// the host is left as it was.
    fn execute(&mut self, channel: &mut dyn CommandChannel) -> CommandResult {
        for index in 0..self.commands.len() {
            if let Err(e) = self.commands[index].execute(channel) {
                log::warn!("{}: child {} failed, rolling back: {}", self.label, index, e);
                for done in self.commands[..index].iter_mut().rev() {
                    if let Err(rollback) = done.undo(channel) {
                        log::error!("{}: rollback of {} failed: {}", self.label, done.description(), rollback);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// On a failing child, the children already undone are executed again
    /// so the bulk stays fully applied and can be undone later.
    fn undo(&mut self, channel: &mut dyn CommandChannel) -> CommandResult {
        for index in (0..self.commands.len()).rev() {
            if let Err(e) = self.commands[index].undo(channel) {
                log::warn!("{}: undo of child {} failed, reapplying: {}", self.label, index, e);
                for done in self.commands[index + 1..].iter_mut() {
                    if let Err(reapply) = done.execute(channel) {
                        log::error!("{}: reapplying {} failed: {}", self.label, done.description(), reapply);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn sub_commands(&self) -> &[Box<dyn Command>] {
        &self.commands
    }
}

/// Submit `commands` as one unit: nothing for an empty batch, the command
/// itself for a batch of one, a [`BulkCommand`] otherwise.
pub fn submit_batch(
    mut commands: Vec<Box<dyn Command>>,
    label: &str,
    executor: &mut dyn super::CommandExecutor,
) -> CommandResult {
    match commands.len() {
        0 => Ok(()),
        1 => match commands.pop() {
            Some(command) => executor.submit(command),
            None => Ok(()),
        },
        _ => executor.submit(Box::new(BulkCommand::new(commands).with_label(label))),
    }
}
