//! Chain links.
//!
//! A `ChainLink` groups the attack segments consumed by one matched input
//! step. Links store indices into the executor's segment table rather than
//! segments themselves, so runtime flags live in exactly one place.

use std::collections::VecDeque;

/// One link of a combo chain: an immutable index template plus the live FIFO
/// queue built from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainLink {
    template: Vec<usize>,
    queue: VecDeque<usize>,
    pub has_finished: bool,
}

impl ChainLink {
    pub fn new(segment_indices: Vec<usize>) -> Self {
        let queue = segment_indices.iter().copied().collect();
        Self {
            template: segment_indices,
            queue,
            has_finished: true,
        }
    }

    /// Pop the next segment index to play.
    pub fn dequeue(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn template_len(&self) -> usize {
        self.template.len()
    }

    pub fn template(&self) -> &[usize] {
        &self.template
    }

    /// Rebuild the live queue from the template. Always restores the original
    /// count and order, no matter how much was consumed; idempotent.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.queue.extend(self.template.iter().copied());
        self.has_finished = true;
    }
}
