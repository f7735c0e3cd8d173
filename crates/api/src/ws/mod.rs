//! WebSocket transport for the live dashboard.
//!
//! Connections subscribe to the shared [`Broadcaster`](aquawatch_events::Broadcaster)
//! and forward whatever it queues for them; inbound text is ignored.

mod handler;
mod heartbeat;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
