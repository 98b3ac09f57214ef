//! Collaborators shared by one editing session.

use void_event::{EventBus, FrameScheduler};

use super::editor_state::Editor;
use crate::commands::{CommandChannel, OutgoingQueue};
use crate::scene::{InstanceRegistry, InstanceTable};

/// Notification bus, frame queue, host channel and renderer registry of a
/// session, passed explicitly to everything that needs them.
pub struct SessionContext {
    pub events: EventBus,
    pub frames: FrameScheduler<Editor>,
    pub channel: Box<dyn CommandChannel>,
    pub instances: Box<dyn InstanceRegistry>,
}

impl SessionContext {
    pub fn new(channel: Box<dyn CommandChannel>, instances: Box<dyn InstanceRegistry>) -> Self {
        Self {
            events: EventBus::new(),
            frames: FrameScheduler::new(),
            channel,
            instances,
        }
    }

    /// A session over in-memory collaborators. The returned handles share
    /// state with the ones inside the session.
    pub fn in_memory() -> (Self, OutgoingQueue, InstanceTable) {
        let queue = OutgoingQueue::new();
        let table = InstanceTable::new();
        let session = Self::new(Box::new(queue.clone()), Box::new(table.clone()));
        (session, queue, table)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("events", &self.events)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
