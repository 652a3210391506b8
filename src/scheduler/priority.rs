use crate::executor::task::TaskUnit;
use std::collections::BinaryHeap;

/// Max-heap of [`TaskUnit`]s.
///
/// Not synchronized on its own: the pool keeps it behind the same lock as
/// its stop flag so that "work arrived" and "shutdown requested" are always
/// observed together.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<TaskUnit>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, unit: TaskUnit) {
        self.heap.push(unit);
    }

    /// Removes and returns the most urgent unit.
    pub fn pop(&mut self) -> Option<TaskUnit> {
        self.heap.pop()
    }

    #[cfg(test)]
    pub fn peek_priority(&self) -> Option<crate::executor::task::Priority> {
        self.heap.peek().map(|unit| unit.priority())
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Empties the queue, handing back every pending unit unordered.
    pub fn take_all(&mut self) -> Vec<TaskUnit> {
        std::mem::take(&mut self.heap).into_vec()
    }
}
