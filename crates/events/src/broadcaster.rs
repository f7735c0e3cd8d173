//! Fan-out of live events to dashboard subscribers.
//!
//! Every subscriber owns a bounded outbound queue. [`Broadcaster::broadcast`]
//! serializes an event once and enqueues it to each queue without waiting;
//! a subscriber whose queue is full or closed is dropped from the registry
//! once the pass completes. The transport task on the other end of the
//! queue turns [`Outbound`] values into frames.

use std::collections::HashMap;
use std::sync::Arc;

use aquawatch_core::types::Timestamp;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::event::LiveEvent;

/// Default capacity of each subscriber's outbound queue.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

pub type SubscriberId = Uuid;

/// A message queued for one subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// A serialized [`LiveEvent`], shared between all subscribers.
    Event(Arc<str>),
    /// Heartbeat.
    Ping,
    /// The server is shutting down.
    Close,
}

/// Why a send to a single subscriber failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    /// The subscriber's queue is full; it is not keeping up.
    #[error("Subscriber queue is full")]
    Lagging,

    /// The subscriber's receiving end has gone away.
    #[error("Subscriber disconnected")]
    Disconnected,
}

impl<T> From<TrySendError<T>> for BroadcastError {
    fn from(err: TrySendError<T>) -> Self {
        match err {
            TrySendError::Full(_) => BroadcastError::Lagging,
            TrySendError::Closed(_) => BroadcastError::Disconnected,
        }
    }
}

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers the message was enqueued for.
    pub delivered: usize,
    /// Subscribers that failed and were removed.
    pub dropped: usize,
}

/// The receiving side handed to a connection task by [`Broadcaster::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    receiver: mpsc::Receiver<Outbound>,
}

impl Subscription {
    /// Next queued message, or `None` once the broadcaster has dropped this
    /// subscriber.
    pub async fn recv(&mut self) -> Option<Outbound> {
        self.receiver.recv().await
    }

    /// Split into the id and the raw receiver.
    pub fn into_parts(self) -> (SubscriberId, mpsc::Receiver<Outbound>) {
        (self.id, self.receiver)
    }
}

struct Subscriber {
    sender: mpsc::Sender<Outbound>,
    connected_at: Timestamp,
}

/// Registry of live subscribers.
///
/// Thread-safe via interior `RwLock`; wrapped in `Arc` and shared through
/// application state. The lock is only held to snapshot senders or to
/// insert and remove entries, never while enqueuing.
pub struct Broadcaster {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    buffer: usize,
}

impl Broadcaster {
    /// Create a broadcaster whose subscribers each get a queue of `buffer`
    /// messages (at least one).
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
        }
    }

    /// Register a new subscriber. It receives every broadcast that starts
    /// after this call returns.
    pub async fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();
        let subscriber = Subscriber {
            sender,
            connected_at: chrono::Utc::now(),
        };
        self.subscribers.write().await.insert(id, subscriber);
        tracing::debug!(subscriber_id = %id, "Subscriber registered");
        Subscription { id, receiver }
    }

    /// Remove a subscriber. No-op if it is already gone.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        if let Some(subscriber) = self.subscribers.write().await.remove(&id) {
            let connected_secs = (chrono::Utc::now() - subscriber.connected_at).num_seconds();
            tracing::debug!(subscriber_id = %id, connected_secs, "Subscriber removed");
        }
    }

    /// Push an event to every current subscriber.
    ///
    /// The event is serialized once. Zero subscribers is a no-op.
    pub async fn broadcast(&self, event: &LiveEvent) -> BroadcastReport {
        let payload: Arc<str> = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::error!(kind = event.kind(), error = %e, "Failed to serialize live event");
                return BroadcastReport::default();
            }
        };
        self.fan_out(Outbound::Event(payload)).await
    }

    /// Queue a heartbeat ping for every subscriber, pruning dead ones.
    pub async fn ping_all(&self) -> BroadcastReport {
        self.fan_out(Outbound::Ping).await
    }

    /// Queue a Close for every subscriber, then clear the registry.
    ///
    /// Dropping the senders closes every queue, so connection tasks stop
    /// even when the Close itself could not be enqueued.
    pub async fn shutdown_all(&self) {
        let drained: Vec<Subscriber> = {
            let mut subscribers = self.subscribers.write().await;
            subscribers.drain().map(|(_, s)| s).collect()
        };
        let count = drained.len();
        for subscriber in drained {
            let _ = subscriber.sender.try_send(Outbound::Close);
        }
        tracing::info!(count, "Closed all live subscribers");
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    async fn fan_out(&self, message: Outbound) -> BroadcastReport {
        let snapshot: Vec<(SubscriberId, mpsc::Sender<Outbound>)> = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .iter()
                .map(|(id, s)| (*id, s.sender.clone()))
                .collect()
        };
        if snapshot.is_empty() {
            return BroadcastReport::default();
        }

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        for (id, sender) in snapshot {
            match sender.try_send(message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    let reason = BroadcastError::from(e);
                    tracing::debug!(subscriber_id = %id, error = %reason, "Dropping subscriber");
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &failed {
                subscribers.remove(id);
            }
        }
        report.dropped = failed.len();
        report
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}
