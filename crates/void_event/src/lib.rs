//! # void_event - Editor Notification System
//!
//! Fire-and-observe notifications for the editor:
//! - Typed events keyed by `TypeId`
//! - Synchronous delivery inside the publishing call
//! - Priority-ordered handlers
//! - A [`FrameScheduler`] for work that must wait for the next frame
//!
//! Everything here runs on the editor's single control thread, so handlers
//! are plain `Fn` closures without `Send`/`Sync` bounds.

pub mod frame;

pub use frame::{FrameScheduler, FrameTask};

use std::any::{Any, TypeId};
use std::collections::BTreeMap;

/// Event priority
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// Trait for events
pub trait Event: 'static {}

// Blanket implementation
impl<T: 'static> Event for T {}

/// Dynamic event handler
pub type DynamicHandler = Box<dyn Fn(&dyn Any)>;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Event bus for publishing and subscribing to events.
///
/// Unlike a queued bus, `publish` hands the event to every matching handler
/// before it returns. Deferred delivery goes through [`FrameScheduler`].
pub struct EventBus {
    /// Typed handlers
    handlers: BTreeMap<TypeId, Vec<(SubscriberId, Priority, DynamicHandler)>>,
    /// Next subscriber ID
    next_subscriber_id: u64,
    /// Number of events published so far
    published: u64,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
            next_subscriber_id: 1,
            published: 0,
        }
    }

    /// Publish an event to all subscribers of its type.
    pub fn publish<E: Event>(&mut self, event: E) {
        self.published += 1;
        if let Some(handlers) = self.handlers.get(&TypeId::of::<E>()) {
            for (_, _, handler) in handlers {
                handler(&event);
            }
        }
    }

    /// Subscribe to an event type
    pub fn subscribe<E: Event, F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + 'static,
    {
        self.subscribe_with_priority::<E, F>(handler, Priority::Normal)
    }

    /// Subscribe with priority
    pub fn subscribe_with_priority<E: Event, F>(
        &mut self,
        handler: F,
        priority: Priority,
    ) -> SubscriberId
    where
        F: Fn(&E) + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;

        let type_id = TypeId::of::<E>();
        let wrapped_handler: DynamicHandler = Box::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                handler(event);
            }
        });

        let handlers = self.handlers.entry(type_id).or_default();
        handlers.push((id, priority, wrapped_handler));
        // Stable sort keeps subscription order within a priority
        handlers.sort_by(|a, b| b.1.cmp(&a.1));

        id
    }

    /// Unsubscribe
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        for handlers in self.handlers.values_mut() {
            handlers.retain(|(sub_id, _, _)| *sub_id != id);
        }
    }

    /// Number of handlers registered for `E`.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.handlers
            .get(&TypeId::of::<E>())
            .map_or(0, |handlers| handlers.len())
    }

    /// Total events published since creation.
    pub fn published_count(&self) -> u64 {
        self.published
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.handlers.len())
            .field("published", &self.published)
            .finish()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::frame::{FrameScheduler, FrameTask};
    pub use crate::{Event, EventBus, Priority, SubscriberId};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct TestEvent(i32);
    struct OtherEvent;

    #[test]
    fn test_event_bus_delivers_synchronously() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        bus.subscribe(move |e: &TestEvent| sink.borrow_mut().push(e.0));

        bus.publish(TestEvent(42));
        // No processing step: the handler already ran
        assert_eq!(*seen.borrow(), vec![42]);
        assert_eq!(bus.published_count(), 1);
    }

    #[test]
    fn test_handlers_only_see_their_type() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let sink = hits.clone();

        bus.subscribe(move |_: &TestEvent| *sink.borrow_mut() += 1);
        bus.publish(OtherEvent);

        assert_eq!(*hits.borrow(), 0);
        assert_eq!(bus.subscriber_count::<TestEvent>(), 1);
        assert_eq!(bus.subscriber_count::<OtherEvent>(), 0);
    }

    #[test]
    fn test_priority() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let order1 = order.clone();
        let order2 = order.clone();

        bus.subscribe_with_priority(
            move |e: &TestEvent| order1.borrow_mut().push(("low", e.0)),
            Priority::Low,
        );
        bus.subscribe_with_priority(
            move |e: &TestEvent| order2.borrow_mut().push(("high", e.0)),
            Priority::High,
        );

        bus.publish(TestEvent(7));

        let received = order.borrow();
        assert_eq!(received[0].0, "high");
        assert_eq!(received[1].0, "low");
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let sink = hits.clone();

        let id = bus.subscribe(move |_: &TestEvent| *sink.borrow_mut() += 1);
        bus.publish(TestEvent(1));
        bus.unsubscribe(id);
        bus.publish(TestEvent(2));

        assert_eq!(*hits.borrow(), 1);
    }
}
