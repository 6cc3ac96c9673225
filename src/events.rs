//! Per-simulation event bus
//!
//! Each simulation owns its bus; two buses never see each other's
//! subscribers. Topics are typed, so a subscriber can only receive the
//! payload its topic carries.

use serde::{Deserialize, Serialize};

use crate::sim::CollisionRecord;

/// Handle returned by [`Topic::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// Subscribers for one payload type, called in subscription order
pub struct Topic<T> {
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T> Default for Topic<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> std::fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T> Topic<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, payload: &T) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Edit history notifications, carrying the change description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEvent {
    Applied(String),
    Undone(String),
    Redone(String),
}

/// All topics of one simulation
#[derive(Debug, Default)]
pub struct EventBus {
    pub collisions: Topic<CollisionRecord>,
    pub history: Topic<HistoryEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }
}
