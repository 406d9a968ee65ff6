//! The event calendar: a binary min-heap over the event total order.

use crate::event::Event;

// ============================================================================
// Min-Heap
// ============================================================================

/// A binary min-heap over a dynamic array.
///
/// `insert` and `extract_min` are `O(log n)`; `peek` is `O(1)`. The std
/// `BinaryHeap` is a max-heap with no stable contract about equal
/// elements; the calendar needs a min-heap whose order is exactly the
/// event total order, so it is built directly.
#[derive(Debug, Default)]
pub struct MinHeap<T: Ord> {
    items: Vec<T>,
}

impl<T: Ord> MinHeap<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let min = self.items.pop();
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        min
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.items[index] < self.items[parent] {
                self.items.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;
            if left < len && self.items[left] < self.items[smallest] {
                smallest = left;
            }
            if right < len && self.items[right] < self.items[smallest] {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.items.swap(index, smallest);
            index = smallest;
        }
    }

    /// Whether the heap property holds at every node. Debug helper.
    pub fn validate(&self) -> bool {
        (1..self.items.len()).all(|i| self.items[(i - 1) / 2] <= self.items[i])
    }
}

// ============================================================================
// Event Calendar
// ============================================================================

/// Ordered storage of pending events.
///
/// The kernel assigns each event its sequence number before insertion;
/// the calendar itself never reorders equal-time events relative to
/// their insertion order.
#[derive(Debug)]
pub struct EventCalendar {
    heap: MinHeap<Event>,
}

impl Default for EventCalendar {
    fn default() -> Self {
        Self {
            heap: MinHeap::new(),
        }
    }
}

impl EventCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: Event) {
        self.heap.push(event);
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek()
    }

    pub fn extract_min(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Whether the heap property holds. Debug helper.
    pub fn validate(&self) -> bool {
        self.heap.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================
