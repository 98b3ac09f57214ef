//! Undo/Redo history with transaction support.
//!
//! Commands enter the history once they have been sent to the host.
//! Commands can be grouped into transactions so a multi-step edit undoes
//! as one unit.

use crate::commands::{
    BulkCommand, Command, CommandChannel, CommandError, CommandExecutor, CommandResult,
};

/// Commands collected while a transaction is open.
pub struct Transaction {
    pub name: String,
    pub commands: Vec<Box<dyn Command>>,
}

impl Transaction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: Box<dyn Command>) {
        self.commands.push(cmd);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Undo/redo history stack.
pub struct UndoHistory {
    /// Commands that can be undone
    undo_stack: Vec<Box<dyn Command>>,
    /// Commands that can be redone
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum history size
    max_size: usize,
    current_transaction: Option<Transaction>,
    /// Modified since last save
    dirty: bool,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            current_transaction: None,
            dirty: false,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the next undo command.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Description of the next redo command.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Run `cmd` against the host and record it.
    ///
    /// A failed command is not recorded.
    pub fn execute(&mut self, mut cmd: Box<dyn Command>, channel: &mut dyn CommandChannel) -> CommandResult {
        cmd.execute(channel)?;
        log::debug!("executed {}", cmd.description());
        self.push(cmd);
        Ok(())
    }

    /// Undo the last command. Returns `Ok(false)` when there is nothing to undo.
    ///
    /// On failure the command stays on the undo stack.
    pub fn undo(&mut self, channel: &mut dyn CommandChannel) -> Result<bool, CommandError> {
        let Some(mut cmd) = self.undo_stack.pop() else {
            log::debug!("nothing to undo");
            return Ok(false);
        };
        match cmd.undo(channel) {
            Ok(()) => {
                log::info!("Undo: {}", cmd.description());
                self.redo_stack.push(cmd);
                self.dirty = true;
                Ok(true)
            }
            Err(e) => {
                log::error!("Undo failed: {}", e);
                self.undo_stack.push(cmd);
                Err(e)
            }
        }
    }

    /// Redo the last undone command. Returns `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, channel: &mut dyn CommandChannel) -> Result<bool, CommandError> {
        let Some(mut cmd) = self.redo_stack.pop() else {
            log::debug!("nothing to redo");
            return Ok(false);
        };
        match cmd.execute(channel) {
            Ok(()) => {
                log::info!("Redo: {}", cmd.description());
                self.undo_stack.push(cmd);
                self.dirty = true;
                Ok(true)
            }
            Err(e) => {
                log::error!("Redo failed: {}", e);
                self.redo_stack.push(cmd);
                Err(e)
            }
        }
    }

    /// Begin a new transaction.
    /// Commands executed during a transaction are grouped as one undo unit.
    pub fn begin_transaction(&mut self, name: impl Into<String>) {
        if self.current_transaction.is_some() {
            log::warn!("Beginning transaction while one is already open");
        }
        self.current_transaction = Some(Transaction::new(name));
    }

    /// Close the open transaction into a single [`BulkCommand`].
    pub fn commit_transaction(&mut self) {
        if let Some(transaction) = self.current_transaction.take() {
            if !transaction.is_empty() {
                let bulk = BulkCommand::new(transaction.commands).with_label(transaction.name);
                self.push_command(Box::new(bulk));
            }
        }
    }

    /// Drop the open transaction without recording it.
    ///
    /// Its commands were already sent; nothing is sent back to the host.
    pub fn rollback_transaction(&mut self) {
        if let Some(transaction) = self.current_transaction.take() {
            log::debug!(
                "rolled back transaction '{}' ({} command(s))",
                transaction.name,
                transaction.commands.len()
            );
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.current_transaction.is_some()
    }

    /// Record a command that has already been executed.
    pub fn push(&mut self, cmd: Box<dyn Command>) {
        if let Some(ref mut transaction) = self.current_transaction {
            transaction.push(cmd);
        } else {
            self.push_command(cmd);
        }
    }

    fn push_command(&mut self, cmd: Box<dyn Command>) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear(); // a new action discards the redo branch
        self.dirty = true;

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_transaction = None;
        self.dirty = false;
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

impl std::fmt::Debug for UndoHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoHistory")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("max_size", &self.max_size)
            .field("in_transaction", &self.in_transaction())
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// Runs submitted commands against the host and records them.
pub struct HistoryExecutor<'a> {
    history: &'a mut UndoHistory,
    channel: &'a mut dyn CommandChannel,
}

impl<'a> HistoryExecutor<'a> {
    pub fn new(history: &'a mut UndoHistory, channel: &'a mut dyn CommandChannel) -> Self {
        Self { history, channel }
    }
}

impl CommandExecutor for HistoryExecutor<'_> {
    fn submit(&mut self, command: Box<dyn Command>) -> CommandResult {
        self.history.execute(command, &mut *self.channel)
    }
}
