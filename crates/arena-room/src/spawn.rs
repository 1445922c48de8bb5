//! Spawn slot allocation.
//!
//! A room has a fixed, ordered list of spawn points. Each connected player
//! is bound to one of them; the allocator tracks which slots are bound and
//! hands out free ones deterministically.
//!
//! None of the operations fail. When every slot is taken the allocator
//! still answers, reusing an occupied slot (see [`SpawnAllocator::acquire_first_free`]
//! and [`SpawnAllocator::next_free`]). Callers must tolerate two players
//! sharing a slot once the room holds more players than spawn points.

use std::collections::BTreeSet;

use crate::config::{DEFAULT_SPAWN_POINTS, SpawnPoint};

/// A slot handed out by the allocator: its index and coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSlot {
    pub index: usize,
    pub point: SpawnPoint,
}

/// One mutation of the occupancy set, recorded in test builds.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotOp {
    Acquire(usize),
    Release(usize),
}

/// Owns the spawn points and the set of occupied slot indices.
#[derive(Debug, Clone)]
pub struct SpawnAllocator {
    points: Vec<SpawnPoint>,
    occupied: BTreeSet<usize>,
    #[cfg(test)]
    journal: Vec<SlotOp>,
}

impl SpawnAllocator {
    /// Creates an allocator with every slot free.
    ///
    /// An empty list is replaced by [`DEFAULT_SPAWN_POINTS`] so that slot
    /// arithmetic always has at least one point to work with.
    pub fn new(points: Vec<SpawnPoint>) -> Self {
        let points = if points.is_empty() {
            tracing::warn!("no spawn points given, using the default layout");
            DEFAULT_SPAWN_POINTS.to_vec()
        } else {
            points
        };
        Self {
            points,
            occupied: BTreeSet::new(),
            #[cfg(test)]
            journal: Vec::new(),
        }
    }

    /// Binds the lowest-numbered free slot and returns it.
    ///
    /// If every slot is occupied this returns slot 0 anyway and the slot
    /// ends up shared.
    pub fn acquire_first_free(&mut self) -> SpawnSlot {
        let index = match (0..self.points.len()).find(|i| !self.occupied.contains(i)) {
            Some(index) => index,
            None => {
                tracing::warn!(
                    slots = self.points.len(),
                    "all spawn slots occupied, falling back to slot 0"
                );
                0
            }
        };
        self.mark(index);
        SpawnSlot {
            index,
            point: self.points[index],
        }
    }

    /// Frees a slot. Freeing a slot that is already free, or an index
    /// outside the list, does nothing.
    pub fn release(&mut self, index: usize) {
        if self.occupied.remove(&index) {
            #[cfg(test)]
            self.journal.push(SlotOp::Release(index));
        }
    }

    /// Binds the first free slot after `current`, scanning cyclically.
    ///
    /// The scan starts at `(current + 1) mod N` (slot 0 when `current` is
    /// `None`) and visits every slot once. When nothing is free the start
    /// slot is returned and bound regardless.
    ///
    /// `current` is left bound. The caller frees it after the player has
    /// moved, so the old slot can't be handed to someone else while the
    /// player is still between the two.
    pub fn next_free(&mut self, current: Option<usize>) -> SpawnSlot {
        let n = self.points.len();
        let start = current.map_or(0, |i| (i % n + 1) % n);
        let index = match (0..n)
            .map(|k| (start + k) % n)
            .find(|i| !self.occupied.contains(i))
        {
            Some(index) => index,
            None => {
                tracing::warn!(
                    slots = n,
                    slot = start,
                    "no free spawn slot, reusing the next one in order"
                );
                start
            }
        };
        self.mark(index);
        SpawnSlot {
            index,
            point: self.points[index],
        }
    }

    /// The coordinates of a slot.
    pub fn point(&self, index: usize) -> Option<SpawnPoint> {
        self.points.get(index).copied()
    }

    /// Returns `true` if the slot is bound to some player.
    pub fn is_occupied(&self, index: usize) -> bool {
        self.occupied.contains(&index)
    }

    /// Number of spawn points (N).
    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    /// Number of bound slots.
    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Bound slot indices in ascending order.
    pub fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        self.occupied.iter().copied()
    }

    fn mark(&mut self, index: usize) {
        self.occupied.insert(index);
        #[cfg(test)]
        self.journal.push(SlotOp::Acquire(index));
    }

    #[cfg(test)]
    pub(crate) fn journal(&self) -> &[SlotOp] {
        &self.journal
    }
}
