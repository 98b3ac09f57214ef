//! Outbound path from commands to the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::{json, Value};

use super::command::{CommandError, CommandResult};
use crate::transfer::GameObjectTransferData;

/// One named operation with its payload, as the host receives it.
#[derive(Clone, Debug, PartialEq)]
pub struct HostCommand {
    pub kind: String,
    pub payload: GameObjectTransferData,
}

impl HostCommand {
    pub fn new(kind: impl Into<String>, payload: GameObjectTransferData) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Wire form `{ "type": .., "gameObjectTransferData": .. }`.
    pub fn to_json(&self) -> Value {
        json!({
            "type": self.kind,
            "gameObjectTransferData": self.payload.to_table(),
        })
    }
}

/// Fire-and-forget delivery of host commands.
pub trait CommandChannel {
    fn deliver(&mut self, command: HostCommand) -> CommandResult;
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<HostCommand>,
    closed: bool,
}

/// Buffers host commands until the transport drains them.
///
/// Clones share one queue.
#[derive(Clone, Debug, Default)]
pub struct OutgoingQueue {
    state: Rc<RefCell<QueueState>>,
}

impl OutgoingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered command, oldest first.
    pub fn drain(&self) -> Vec<HostCommand> {
        self.state.borrow_mut().pending.drain(..).collect()
    }

    /// Copy of the buffered commands, leaving them queued.
    pub fn pending(&self) -> Vec<HostCommand> {
        self.state.borrow().pending.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().pending.is_empty()
    }

    /// Refuse further deliveries.
    pub fn close(&self) {
        self.state.borrow_mut().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }
}

impl CommandChannel for OutgoingQueue {
    fn deliver(&mut self, command: HostCommand) -> CommandResult {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(CommandError::ChannelClosed);
        }
        log::debug!("queued {} for {:?}", command.kind, command.payload.guid);
        state.pending.push_back(command);
        Ok(())
    }
}
