//! Change Feed
//!
//! Accepts change events from mutation paths without blocking them and
//! relays each one, in order, to every registered subscriber.
//!
//! ```text
//! set/delete/reaper -> publish() -> unbounded queue -> Dispatcher::run()
//!                                                        |
//!                                   SubscriberRegistry::deliver() -> per-subscriber channel
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, trace, warn};

use super::{ChangeEvent, SubscriberId, SubscriberRegistry, Subscription};

// == Change Feed ==
/// Producer handle for the change stream. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    queue: mpsc::UnboundedSender<ChangeEvent>,
    registry: Arc<SubscriberRegistry>,
}

/// Drains the feed's queue into the registry.
#[derive(Debug)]
pub struct Dispatcher {
    queue: mpsc::UnboundedReceiver<ChangeEvent>,
    registry: Arc<SubscriberRegistry>,
}

impl ChangeFeed {
    /// Creates a feed and the dispatcher that must be driven for events to
    /// reach subscribers. `subscriber_buffer` bounds each subscriber's
    /// backlog.
    pub fn new(subscriber_buffer: usize) -> (Self, Dispatcher) {
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = Arc::new(SubscriberRegistry::new(subscriber_buffer));

        let feed = Self {
            queue: tx,
            registry: Arc::clone(&registry),
        };
        let dispatcher = Dispatcher {
            queue: rx,
            registry,
        };
        (feed, dispatcher)
    }

    /// Creates a feed and spawns its dispatcher on the current runtime.
    pub fn spawn(subscriber_buffer: usize) -> (Self, JoinHandle<()>) {
        let (feed, dispatcher) = Self::new(subscriber_buffer);
        let handle = tokio::spawn(dispatcher.run());
        (feed, handle)
    }

    /// Queues `event` for delivery. Never blocks.
    ///
    /// Events published from one thread reach every subscriber in the order
    /// they were published.
    pub fn publish(&self, event: ChangeEvent) {
        if let Err(err) = self.queue.send(event) {
            warn!(key = %err.0.key, "change feed dispatcher stopped, event dropped");
        }
    }

    /// Registers a new subscriber.
    ///
    /// Events published after this returns are delivered to it. Callers
    /// seeding the subscriber with current state should take the snapshot
    /// after subscribing.
    pub fn subscribe(&self) -> Subscription {
        self.registry.register()
    }

    /// Removes a subscriber. Safe to call more than once.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.registry.unregister(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }
}

impl Dispatcher {
    /// Runs until every [`ChangeFeed`] handle has been dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.queue.recv().await {
            let report = self.registry.deliver(Arc::new(event));
            trace!(
                delivered = report.delivered,
                dropped = report.unregistered.len(),
                "change event dispatched"
            );
        }
        info!("change feed closed");
    }
}
