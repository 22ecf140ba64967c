//! Subscriber Registry
//!
//! Tracks the live set of subscribers. Each subscriber owns a bounded
//! channel so a slow reader only ever hurts itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::ChangeEvent;

/// Identity of a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered subscriber's end of the feed.
///
/// The receiver yields `None` once the registry has dropped the subscriber,
/// either through [`SubscriberRegistry::unregister`] or because its buffer
/// overflowed.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<Arc<ChangeEvent>>,
}

/// Outcome of delivering one event to every subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Subscribers that accepted the event
    pub delivered: usize,
    /// Subscribers removed because their buffer was full or closed
    pub unregistered: Vec<SubscriberId>,
}

pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Arc<ChangeEvent>>>>,
    next_id: AtomicU64,
    buffer_capacity: usize,
}

impl SubscriberRegistry {
    /// Creates an empty registry whose subscribers buffer up to
    /// `buffer_capacity` undelivered events each.
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            buffer_capacity: buffer_capacity.max(1),
        }
    }

    /// Adds a subscriber and returns its receiving end.
    pub fn register(&self) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, receiver) = mpsc::channel(self.buffer_capacity);

        self.subscribers.write().insert(id, tx);
        debug!(subscriber = %id, "subscriber registered");

        Subscription { id, receiver }
    }

    /// Removes a subscriber. Returns whether it was still registered.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "subscriber unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Hands `event` to every currently registered subscriber.
    ///
    /// Works on a copy of the subscriber set so concurrent register and
    /// unregister calls never block on delivery. A subscriber whose buffer
    /// is full or whose receiver is gone is unregistered; the rest still
    /// get the event.
    pub fn deliver(&self, event: Arc<ChangeEvent>) -> DeliveryReport {
        let targets: Vec<(SubscriberId, mpsc::Sender<Arc<ChangeEvent>>)> = self
            .subscribers
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut report = DeliveryReport::default();
        for (id, tx) in targets {
            match tx.try_send(Arc::clone(&event)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = %id, "subscriber buffer full, dropping subscriber");
                    report.unregistered.push(id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscriber = %id, "subscriber went away");
                    report.unregistered.push(id);
                }
            }
        }

        if !report.unregistered.is_empty() {
            let mut subscribers = self.subscribers.write();
            for id in &report.unregistered {
                subscribers.remove(id);
            }
        }

        report
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &self.len())
            .field("buffer_capacity", &self.buffer_capacity)
            .finish_non_exhaustive()
    }
}
