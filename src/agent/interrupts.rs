//! FIFO of user messages injected while a run is in flight.

use std::collections::VecDeque;

#[derive(Debug, Default)]
pub(crate) struct InterruptQueue {
    queue: VecDeque<String>,
}

impl InterruptQueue {
    pub(crate) fn push(&mut self, text: String) {
        self.queue.push_back(text);
    }

    /// Remove every queued message in arrival order.
    pub(crate) fn drain(&mut self) -> Vec<String> {
        self.queue.drain(..).collect()
    }

    /// Discard queued messages; returns how many were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}
