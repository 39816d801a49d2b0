//! # Event Bus Adapter
//!
//! In-memory publisher built on `tokio::sync::broadcast`. Keeps a bounded
//! history so late readers (tests, snapshots) can still inspect what was
//! emitted.

use crate::events::SaleEvent;
use crate::ports::outbound::EventPublisher;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// In-memory event bus.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<SaleEvent>,
    history: RwLock<VecDeque<SaleEvent>>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with the given channel and history capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            history: RwLock::new(VecDeque::with_capacity(capacity)),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to all events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SaleEvent> {
        self.sender.subscribe()
    }

    /// Most recent events, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<SaleEvent> {
        self.history.read().iter().cloned().collect()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: SaleEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        {
            let mut history = self.history.write();
            if history.len() == self.capacity {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        let topic = event.topic();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(topic, receivers, "Event published");
                receivers
            }
            // No subscribers is not an error: the history still has it.
            Err(_) => 0,
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
