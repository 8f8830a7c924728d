//! Change events and the real-time fan-out hub.

pub mod event;
pub mod hub;

pub use event::{ChangeEvent, GREETING};
pub use hub::{BroadcastHub, DEFAULT_QUEUE_CAPACITY, Frame, PublishReport, SubscriberId, Subscription};
