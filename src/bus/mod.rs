//! Typed publish/subscribe bus.
//!
//! Delivery is synchronous: [`Bus::publish`] runs every current subscriber of
//! the message's type, in subscription order, before returning. The
//! subscriber list is snapshotted first, so a handler may publish or
//! subscribe without deadlocking; subscriptions added during delivery see
//! the next message only.

pub mod message;

pub use message::{LocationChanged, Message, PathMatched, ViewState, ViewUpdate};

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

type Handler = Arc<dyn Fn(&dyn Message) + Send + Sync>;

/// Handle returned by [`Bus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    type_id: TypeId,
    seq: u64,
}

#[derive(Default)]
struct Registry {
    next: u64,
    handlers: HashMap<TypeId, Vec<(u64, Handler)>>,
}

/// Cloneable handle to a shared bus.
#[derive(Clone, Default)]
pub struct Bus {
    registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.lock();
        f.debug_struct("Bus")
            .field("types", &registry.handlers.len())
            .field(
                "subscribers",
                &registry.handlers.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `handler` for every future message of type `M`.
    pub fn subscribe<M, F>(&self, handler: F) -> Subscription
    where
        M: Message,
        F: Fn(&M) + Send + Sync + 'static,
    {
        let wrapped: Handler = Arc::new(move |message: &dyn Message| {
            if let Some(typed) = message.downcast_ref::<M>() {
                handler(typed);
            }
        });
        let type_id = TypeId::of::<M>();
        let mut registry = self.lock();
        registry.next += 1;
        let seq = registry.next;
        registry.handlers.entry(type_id).or_default().push((seq, wrapped));
        Subscription { type_id, seq }
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut registry = self.lock();
        let Some(list) = registry.handlers.get_mut(&subscription.type_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|(seq, _)| *seq != subscription.seq);
        before != list.len()
    }

    /// Deliver `message` to every subscriber of its type.
    pub fn publish<M: Message>(&self, message: M) {
        self.publish_dyn(&message);
    }

    /// Deliver an already type-erased message.
    pub fn publish_dyn(&self, message: &dyn Message) {
        let type_id = message.as_any().type_id();
        let handlers: Vec<Handler> = self
            .lock()
            .handlers
            .get(&type_id)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        trace!(message = message.message_name(), subscribers = handlers.len(), "publish");
        for handler in handlers {
            handler(message);
        }
    }

    /// Number of subscribers for message type `M`.
    pub fn subscriber_count<M: Message>(&self) -> usize {
        self.lock()
            .handlers
            .get(&TypeId::of::<M>())
            .map_or(0, Vec::len)
    }
}
