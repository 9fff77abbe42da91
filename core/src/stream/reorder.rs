//! Reorder window: admits results by chunk index, drains a contiguous
//! prefix in strictly ascending order.
//!
//! A growable ring addressed by `index % len`. The window starts small and
//! doubles on demand up to a hard cap; an insert further than the cap ahead
//! of the next expected index is a pipeline integrity error, as are
//! duplicate indices and slot collisions. Items still buffered at teardown
//! are dropped by the owner, which recycles their buffers.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    /// Index below the next expected index, or already buffered.
    #[error("duplicate chunk index {index}")]
    DuplicateIndex { index: u64 },

    /// Target slot holds a different index even after growth; indicates a
    /// corrupted index sequence upstream.
    #[error("reorder slot collision: index {index} collides with buffered {occupied}")]
    SlotCollision { index: u64, occupied: u64 },

    /// Index too far ahead of the contiguous frontier.
    #[error("reorder window overflow: index {index} is {distance} ahead of next, cap {cap}")]
    Overflow { index: u64, distance: u64, cap: usize },
}

pub struct ReorderWindow<T> {
    slots: Vec<Option<(u64, T)>>,
    next: u64,
    cap: usize,
    buffered: usize,
}

impl<T> ReorderWindow<T> {
    /// `initial` is clamped into `[1, cap]`.
    pub fn new(initial: usize, cap: usize) -> Self {
        let cap = cap.max(1);
        let initial = initial.clamp(1, cap);
        Self {
            slots: (0..initial).map(|_| None).collect(),
            next: 0,
            cap,
            buffered: 0,
        }
    }

    /// Next index the window will emit.
    pub fn next_index(&self) -> u64 {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.buffered == 0
    }

    pub fn len(&self) -> usize {
        self.buffered
    }

    /// Admit `item` under `index`. Indices at or above `next` are accepted
    /// as long as they fit under the growth cap.
    pub fn put(&mut self, index: u64, item: T) -> Result<(), ReorderError> {
        if index < self.next {
            return Err(ReorderError::DuplicateIndex { index });
        }

        let distance = index - self.next;
        if distance >= self.cap as u64 {
            return Err(ReorderError::Overflow {
                index,
                distance,
                cap: self.cap,
            });
        }
        while distance >= self.slots.len() as u64 {
            self.grow();
        }

        let slot = (index % self.slots.len() as u64) as usize;
        match &self.slots[slot] {
            Some((occupied, _)) if *occupied == index => {
                return Err(ReorderError::DuplicateIndex { index });
            }
            Some((occupied, _)) => {
                return Err(ReorderError::SlotCollision {
                    index,
                    occupied: *occupied,
                });
            }
            None => {}
        }

        self.slots[slot] = Some((index, item));
        self.buffered += 1;
        Ok(())
    }

    /// Remove and return the item at the contiguous frontier, if buffered.
    pub fn pop_next(&mut self) -> Option<T> {
        let slot = (self.next % self.slots.len() as u64) as usize;
        match &self.slots[slot] {
            Some((index, _)) if *index == self.next => {
                let (_, item) = self.slots[slot].take().unwrap();
                self.next += 1;
                self.buffered -= 1;
                Some(item)
            }
            _ => None,
        }
    }

    /// Take every buffered item, in no particular order. Used at teardown so
    /// the owner can release leftover buffers.
    pub fn drain(&mut self) -> Vec<T> {
        self.buffered = 0;
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.take().map(|(_, item)| item))
            .collect()
    }

    /// Double the ring and rehash buffered items into their new slots.
    fn grow(&mut self) {
        let new_len = (self.slots.len() * 2).min(self.cap);
        debug_assert!(new_len > self.slots.len());

        let mut new_slots: Vec<Option<(u64, T)>> = (0..new_len).map(|_| None).collect();
        for entry in self.slots.drain(..) {
            if let Some((index, item)) = entry {
                let slot = (index % new_len as u64) as usize;
                debug_assert!(new_slots[slot].is_none());
                new_slots[slot] = Some((index, item));
            }
        }
        self.slots = new_slots;
    }
}
