//! Typed publish/subscribe bus
//!
//! One bus instance per simulation. Handlers for an event type run
//! synchronously, in subscription order, against a copy of the handler list
//! taken when `publish` starts: a handler may subscribe or unsubscribe during
//! dispatch without affecting the pass in progress.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use ahash::AHashMap;
use thiserror::Error;

/// Marker for types that can travel on the bus
pub trait GameEvent: Any + Debug {}

/// Failure reported by a single handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler failed: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// A subscribed callback. Identity is the `Rc` allocation, so keep a clone
/// around to unsubscribe later.
pub type Handler<E> = Rc<dyn Fn(&E) -> HandlerResult>;

/// Wrap a closure as a handler
pub fn handler<E, F>(f: F) -> Handler<E>
where
    E: GameEvent,
    F: Fn(&E) -> HandlerResult + 'static,
{
    Rc::new(f)
}

/// What happened during one `publish`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Default)]
pub struct EventBus {
    // Each entry boxes a `Handler<E>` for the `E` whose TypeId keys the list.
    subscribers: RefCell<AHashMap<TypeId, Vec<Box<dyn Any>>>>,
}

fn same_handler<E>(a: &Handler<E>, b: &Handler<E>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. Returns false (and changes nothing) if this handler
    /// instance is already subscribed to `E`.
    pub fn subscribe<E: GameEvent>(&self, handler: &Handler<E>) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let list = subscribers.entry(TypeId::of::<E>()).or_default();

        let duplicate = list
            .iter()
            .filter_map(|h| h.downcast_ref::<Handler<E>>())
            .any(|h| same_handler(h, handler));
        if duplicate {
            tracing::debug!(event = type_name::<E>(), "duplicate subscription ignored");
            return false;
        }

        list.push(Box::new(Rc::clone(handler)));
        true
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe<E: GameEvent>(&self, handler: &Handler<E>) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let Some(list) = subscribers.get_mut(&TypeId::of::<E>()) else {
            return false;
        };

        let before = list.len();
        list.retain(|h| {
            h.downcast_ref::<Handler<E>>()
                .map_or(true, |h| !same_handler(h, handler))
        });
        list.len() != before
    }

    /// Deliver `event` to every handler subscribed to `E`
    ///
    /// A failing handler is logged and counted; the rest still run.
    pub fn publish<E: GameEvent>(&self, event: &E) -> DispatchReport {
        let snapshot: Vec<Handler<E>> = {
            let subscribers = self.subscribers.borrow();
            match subscribers.get(&TypeId::of::<E>()) {
                Some(list) => list
                    .iter()
                    .filter_map(|h| h.downcast_ref::<Handler<E>>())
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        };

        let mut report = DispatchReport::default();
        for handler in snapshot {
            match (*handler)(event) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    tracing::error!(event = type_name::<E>(), error = %err, "event handler failed");
                    report.failed += 1;
                }
            }
        }

        tracing::trace!(event = ?event, delivered = report.delivered, failed = report.failed, "published");
        report
    }

    /// Number of handlers currently subscribed to `E`
    pub fn subscriber_count<E: GameEvent>(&self) -> usize {
        self.subscribers
            .borrow()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Drop every subscription (teardown)
    pub fn clear(&self) {
        self.subscribers.borrow_mut().clear();
    }
}

impl Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = self.subscribers.borrow();
        let total: usize = subscribers.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("event_kinds", &subscribers.len())
            .field("handlers", &total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping(u32);
    impl GameEvent for Ping {}

    #[derive(Debug)]
    struct Pong;
    impl GameEvent for Pong {}

    fn recorder(log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> Handler<Ping> {
        let log = Rc::clone(log);
        handler(move |e: &Ping| {
            log.borrow_mut().push(format!("{}:{}", name, e.0));
            Ok(())
        })
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        let report = bus.publish(&Ping(1));
        assert_eq!(report, DispatchReport::default());
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(&recorder(&log, "a"));
        bus.subscribe(&recorder(&log, "b"));
        bus.subscribe(&recorder(&log, "c"));

        let report = bus.publish(&Ping(7));
        assert_eq!(report.delivered, 3);
        assert_eq!(*log.borrow(), vec!["a:7", "b:7", "c:7"]);
    }

    #[test]
    fn test_duplicate_subscription_is_noop() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let h = recorder(&log, "a");
        assert!(bus.subscribe(&h));
        assert!(!bus.subscribe(&h));
        assert_eq!(bus.subscriber_count::<Ping>(), 1);

        bus.publish(&Ping(1));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder(&log, "a");
        let b = recorder(&log, "b");
        bus.subscribe(&a);
        bus.subscribe(&b);

        assert!(bus.unsubscribe(&a));
        assert!(!bus.unsubscribe(&a));
        bus.publish(&Ping(2));
        assert_eq!(*log.borrow(), vec!["b:2"]);
    }

    #[test]
    fn test_event_kinds_are_separate() {
        let bus = EventBus::new();
        let pongs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pongs);
        bus.subscribe(&handler(move |_: &Pong| {
            counter.set(counter.get() + 1);
            Ok(())
        }));

        bus.publish(&Ping(1));
        assert_eq!(pongs.get(), 0);
        bus.publish(&Pong);
        assert_eq!(pongs.get(), 1);
    }

    #[test]
    fn test_failing_handler_is_isolated() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(&recorder(&log, "a"));
        bus.subscribe(&handler(|_: &Ping| Err(HandlerError::new("boom"))));
        bus.subscribe(&recorder(&log, "c"));

        let report = bus.publish(&Ping(3));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.is_clean());
        assert_eq!(*log.borrow(), vec!["a:3", "c:3"]);
    }

    #[test]
    fn test_subscribe_during_dispatch_waits_for_next_publish() {
        let bus = Rc::new(EventBus::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let late = recorder(&log, "late");

        let bus_ref = Rc::downgrade(&bus);
        let late_ref = late.clone();
        bus.subscribe(&handler(move |_: &Ping| {
            if let Some(bus) = bus_ref.upgrade() {
                bus.subscribe(&late_ref);
            }
            Ok(())
        }));

        bus.publish(&Ping(1));
        assert!(log.borrow().is_empty());

        bus.publish(&Ping(2));
        assert_eq!(*log.borrow(), vec!["late:2"]);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_does_not_skip_current_pass() {
        let bus = Rc::new(EventBus::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let second = recorder(&log, "second");

        let bus_ref = Rc::downgrade(&bus);
        let second_ref = second.clone();
        bus.subscribe(&handler(move |_: &Ping| {
            if let Some(bus) = bus_ref.upgrade() {
                bus.unsubscribe(&second_ref);
            }
            Ok(())
        }));
        bus.subscribe(&second);

        bus.publish(&Ping(1));
        assert_eq!(*log.borrow(), vec!["second:1"]);
        bus.publish(&Ping(2));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_clear() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(&recorder(&log, "a"));
        bus.clear();
        assert_eq!(bus.subscriber_count::<Ping>(), 0);
    }
}
