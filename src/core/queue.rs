//! Due-ordered event queue.
//!
//! An array-backed binary min-heap over shared event handles, ordered by
//! due moment. Supports insert, peek-minimum, remove-minimum, and removal
//! of an arbitrary event by reference identity. Events with equal due
//! moments compare equal; their emission order is unspecified.

use std::sync::Arc;

use crate::core::event::ScheduledEvent;

/// Reference identity for queued events: two handles name the same event
/// iff they point at the same allocation.
fn same_event(a: &Arc<dyn ScheduledEvent>, b: &Arc<dyn ScheduledEvent>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Binary min-heap of events keyed on their due moment.
///
/// Heap invariant: for every index `i` with children `2i+1` and `2i+2` in
/// bounds, `heap[i].due_at() <= heap[child].due_at()`.
pub struct EventQueue {
    heap: Vec<Arc<dyn ScheduledEvent>>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue holds no events.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert an event; O(log n).
    pub fn insert(&mut self, event: Arc<dyn ScheduledEvent>) {
        self.heap.push(event);
        self.sift_up(self.heap.len() - 1);
    }

    /// The earliest-due event, if any. Does not mutate.
    pub fn peek(&self) -> Option<&Arc<dyn ScheduledEvent>> {
        self.heap.first()
    }

    /// Remove and return the earliest-due event.
    pub fn pop(&mut self) -> Option<Arc<dyn ScheduledEvent>> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let front = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        front
    }

    /// Remove a specific event, located by reference identity; O(n) scan.
    ///
    /// Returns `false` if the event is not queued; a no-op, not an error.
    pub fn remove(&mut self, event: &Arc<dyn ScheduledEvent>) -> bool {
        let Some(index) = self.heap.iter().position(|e| same_event(e, event)) else {
            return false;
        };
        let last = self.heap.len() - 1;
        self.heap.swap(index, last);
        self.heap.pop();
        if index < self.heap.len() {
            // The replacement can violate the invariant in either
            // direction relative to the vacated slot.
            self.sift_up(index);
            self.sift_down(index);
        }
        true
    }

    fn sift_up(&mut self, mut child: usize) {
        while child > 0 {
            let parent = (child - 1) / 2;
            if self.heap[child].due_at() >= self.heap[parent].due_at() {
                break;
            }
            self.heap.swap(child, parent);
            child = parent;
        }
    }

    fn sift_down(&mut self, mut parent: usize) {
        loop {
            let left = parent * 2 + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let mut smallest = left;
            if right < self.heap.len() && self.heap[right].due_at() < self.heap[left].due_at() {
                smallest = right;
            }
            if self.heap[parent].due_at() <= self.heap[smallest].due_at() {
                break;
            }
            self.heap.swap(parent, smallest);
            parent = smallest;
        }
    }

    /// Heap-property check for tests; production paths never call this.
    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        for parent in 0..self.heap.len() {
            for child in [2 * parent + 1, 2 * parent + 2] {
                if child < self.heap.len()
                    && self.heap[parent].due_at() > self.heap[child].due_at()
                {
                    return false;
                }
            }
        }
        true
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
