//! Change Feed Module
//!
//! Fan-out of cache mutations to live subscribers.
//!
//! The store never talks to the feed. Whoever mutates the store publishes
//! the matching [`ChangeEvent`] while still holding the store's write lock,
//! which keeps per-key event order identical to commit order.

mod dispatch;
mod event;
mod registry;

pub use dispatch::{ChangeFeed, Dispatcher};
pub use event::{ChangeEvent, EventKind, ZERO_TIMESTAMP};
pub use registry::{DeliveryReport, SubscriberId, SubscriberRegistry, Subscription};
