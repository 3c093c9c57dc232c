use crate::constants::{EVENT_QUEUE_CAPACITY, EVENT_QUEUE_RETAIN};
use crate::interaction::InteractionEvent;
use smallvec::SmallVec;
use std::collections::VecDeque;

pub type EventBatch = SmallVec<[InteractionEvent; 3]>;

/// Bounded FIFO with drop-oldest overflow.
///
/// Exceeding `capacity` trims to the `retain` most recent events and starts a
/// shedding episode: every later push also drops the oldest entry so the
/// queue stays at `retain`. The episode ends once processing drains the
/// queue below `retain`.
#[derive(Debug)]
pub struct EventQueue {
    items: VecDeque<InteractionEvent>,
    capacity: usize,
    retain: usize,
    shedding: bool,
    dropped: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(EVENT_QUEUE_CAPACITY, EVENT_QUEUE_RETAIN)
    }
}

impl EventQueue {
    pub fn new(capacity: usize, retain: usize) -> Self {
        let capacity = capacity.max(1);
        let retain = retain.clamp(1, capacity);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
            retain,
            shedding: false,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: InteractionEvent) {
        self.items.push_back(event);
        let limit = if self.shedding {
            self.retain
        } else if self.items.len() > self.capacity {
            self.shedding = true;
            log::debug!(
                "[bridge] event queue over capacity ({}), keeping newest {}",
                self.capacity,
                self.retain
            );
            self.retain
        } else {
            return;
        };
        while self.items.len() > limit {
            self.items.pop_front();
            self.dropped += 1;
        }
    }

    /// Dequeue up to `max` events in arrival order.
    pub fn pop_batch(&mut self, max: usize) -> EventBatch {
        let n = max.min(self.items.len());
        let batch: EventBatch = self.items.drain(..n).collect();
        if self.shedding && self.items.len() < self.retain {
            self.shedding = false;
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_shedding(&self) -> bool {
        self.shedding
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractionEvent> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.shedding = false;
    }
}
