//! Indexed binary min-heap shared by the cost-field engine and the turn scheduler.
//!
//! Ordering is supplied by a caller-provided three-way comparator. Every
//! insertion yields a [`QueueHandle`] that stays valid until the value leaves
//! the queue, which allows keys to be decreased in place.

use std::cmp::Ordering;
use std::fmt;

/// Stable reference to a value stored in a [`MinQueue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QueueHandle {
    slot: usize,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    entry: Option<Entry<T>>,
}

#[derive(Debug)]
struct Entry<T> {
    value: T,
    position: usize,
}

/// Min-priority queue ordered by a caller-supplied comparator.
pub struct MinQueue<T, F> {
    compare: F,
    heap: Vec<usize>,
    slots: Vec<Slot<T>>,
    vacant: Vec<usize>,
}

impl<T, F> MinQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty queue ordered by `compare`.
    #[must_use]
    pub fn new(compare: F) -> Self {
        Self {
            compare,
            heap: Vec::new(),
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Creates an empty queue with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        Self {
            compare,
            heap: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
        }
    }

    /// Number of values in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Reports whether the queue holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Adds `value` and returns a handle for later key updates.
    pub fn insert(&mut self, value: T) -> QueueHandle {
        let position = self.heap.len();
        let entry = Some(Entry { value, position });
        let slot = match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot].entry = entry;
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry,
                });
                self.slots.len() - 1
            }
        };
        self.heap.push(slot);
        self.sift_up(position);

        QueueHandle {
            slot,
            generation: self.slots[slot].generation,
        }
    }

    /// Smallest value without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        let slot = *self.heap.first()?;
        self.value(slot)
    }

    /// Removes and returns the smallest value.
    pub fn remove_min(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.swap(0, last);
        let slot = self.heap.pop()?;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }

        let record = &mut self.slots[slot];
        record.generation = record.generation.wrapping_add(1);
        let entry = record.entry.take()?;
        self.vacant.push(slot);
        Some(entry.value)
    }

    /// Value referenced by `handle`, if it is still queued.
    #[must_use]
    pub fn get(&self, handle: QueueHandle) -> Option<&T> {
        if !self.contains(handle) {
            return None;
        }
        self.value(handle.slot)
    }

    /// Reports whether `handle` still refers to a queued value.
    #[must_use]
    pub fn contains(&self, handle: QueueHandle) -> bool {
        self.slots
            .get(handle.slot)
            .map_or(false, |slot| {
                slot.generation == handle.generation && slot.entry.is_some()
            })
    }

    /// Lowers the key of a queued value and restores heap order.
    ///
    /// Returns `false` when the handle no longer refers to a queued value.
    pub fn decrease_key<U>(&mut self, handle: QueueHandle, update: U) -> bool
    where
        U: FnOnce(&mut T),
    {
        if !self.contains(handle) {
            return false;
        }

        let Some(entry) = self.slots[handle.slot].entry.as_mut() else {
            return false;
        };
        update(&mut entry.value);
        let position = entry.position;
        self.sift_up(position);
        if let Some(entry) = self.slots[handle.slot].entry.as_ref() {
            self.sift_down(entry.position);
        }
        true
    }

    fn value(&self, slot: usize) -> Option<&T> {
        self.slots
            .get(slot)
            .and_then(|slot| slot.entry.as_ref())
            .map(|entry| &entry.value)
    }

    fn less(&self, left: usize, right: usize) -> bool {
        match (self.value(self.heap[left]), self.value(self.heap[right])) {
            (Some(a), Some(b)) => (self.compare)(a, b) == Ordering::Less,
            _ => false,
        }
    }

    fn swap(&mut self, left: usize, right: usize) {
        self.heap.swap(left, right);
        for position in [left, right] {
            let slot = self.heap[position];
            if let Some(entry) = self.slots[slot].entry.as_mut() {
                entry.position = position;
            }
        }
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.less(position, parent) {
                break;
            }
            self.swap(position, parent);
            position = parent;
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut smallest = position;
            if left < self.heap.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.heap.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == position {
                break;
            }
            self.swap(position, smallest);
            position = smallest;
        }
    }
}

impl<T: fmt::Debug, F> fmt::Debug for MinQueue<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinQueue")
            .field("len", &self.heap.len())
            .field("slots", &self.slots)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascending(left: &u32, right: &u32) -> Ordering {
        left.cmp(right)
    }

    #[test]
    fn drains_in_ascending_order() {
        let mut queue = MinQueue::new(ascending);
        for value in [42, 7, 19, 3, 88, 7, 0] {
            let _ = queue.insert(value);
        }

        let mut drained = Vec::new();
        while let Some(value) = queue.remove_min() {
            drained.push(value);
        }
        assert_eq!(drained, vec![0, 3, 7, 7, 19, 42, 88]);
        assert!(queue.is_empty());
    }

    #[test]
    fn decrease_key_moves_value_to_front() {
        let mut queue = MinQueue::new(ascending);
        let _ = queue.insert(10);
        let _ = queue.insert(20);
        let handle = queue.insert(30);

        assert!(queue.decrease_key(handle, |value| *value = 5));
        assert_eq!(queue.peek(), Some(&5));
        assert_eq!(queue.remove_min(), Some(5));
        assert!(!queue.contains(handle));
        assert!(!queue.decrease_key(handle, |value| *value = 1));
    }

    #[test]
    fn recycled_slots_do_not_revive_old_handles() {
        let mut queue = MinQueue::new(ascending);
        let stale = queue.insert(1);
        assert_eq!(queue.remove_min(), Some(1));

        let fresh = queue.insert(2);
        assert_ne!(stale, fresh);
        assert_eq!(queue.get(stale), None);
        assert_eq!(queue.get(fresh), Some(&2));
    }

    #[test]
    fn comparator_controls_ordering() {
        let mut queue = MinQueue::new(|left: &(u32, u32), right: &(u32, u32)| {
            left.0.cmp(&right.0).then(right.1.cmp(&left.1))
        });
        let _ = queue.insert((1, 1));
        let _ = queue.insert((1, 9));
        let _ = queue.insert((0, 0));

        assert_eq!(queue.remove_min(), Some((0, 0)));
        assert_eq!(queue.remove_min(), Some((1, 9)));
        assert_eq!(queue.remove_min(), Some((1, 1)));
    }
}
