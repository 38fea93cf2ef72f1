//! Fixed-capacity sliding history.
//!
//! Backs both the position history (recent signal samples) and the
//! direction history (confirmed direction changes). Storage is allocated once
//! at construction; once full, each push overwrites the oldest slot.

/// Bounded FIFO ring buffer
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    slots: Vec<T>,
    capacity: usize,
    /// Index of the oldest element once the buffer has wrapped
    head: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Append an element, returning the evicted oldest one if full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.slots.len() < self.capacity {
            self.slots.push(item);
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.head], item);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Element `index` positions after the oldest
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.slots.len() {
            return None;
        }
        Some(&self.slots[(self.head + index) % self.slots.len()])
    }

    pub fn oldest(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn newest(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.recent(self.len())
    }

    /// Iterate over the newest `n` elements, oldest first
    pub fn recent(&self, n: usize) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        let len = self.slots.len();
        let skip = len - n.min(len);
        (skip..len).map(move |i| &self.slots[(self.head + i) % len])
    }

    /// Drop every element without releasing storage
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}
