//! Outbound event distribution for AquaWatch.
//!
//! - [`broadcaster`] fans live reading/alert events out to dashboard
//!   subscribers.
//! - [`delivery`] pushes alert messages to external channels (SMS).

pub mod broadcaster;
pub mod delivery;
pub mod event;

pub use broadcaster::{
    BroadcastError, BroadcastReport, Broadcaster, Outbound, SubscriberId, Subscription,
    DEFAULT_SUBSCRIBER_BUFFER,
};
pub use delivery::{LogNotifier, Notifier};
pub use event::LiveEvent;
