//! Fixed-size open-addressing table from identifier text to arena entries.
//!
//! Slots hold [`EntryId`]s into the arena that owns the key text, so the table
//! never stores or compares pointers. Probing is linear from the home slot
//! `cksum(key) % size`; the table never grows, and a probe that comes back
//! around to its home slot is a fatal overflow.

use crate::{cksum::cksum_bytes, error::IndexError};

/// Index of an entry in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub u32);

impl EntryId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Key lookup used to compare a probed slot against the key being searched.
pub trait KeySource {
    fn key(&self, id: EntryId) -> &[u8];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Equal key found.
    Occupied(EntryId),
    /// Key absent; this empty slot ends its probe sequence.
    Vacant(usize),
}

pub struct IdTable {
    slots: Vec<Option<EntryId>>,
}

impl IdTable {
    /// Table with `ceil(5 * max_ids / 4)` slots.
    pub fn for_max_ids(max_ids: usize) -> Self {
        let size = (5 * max_ids).div_ceil(4).max(1);
        Self { slots: vec![None; size] }
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    #[inline]
    pub fn home_slot(&self, key: &[u8]) -> usize {
        cksum_bytes(key) as usize % self.slots.len()
    }

    pub fn probe<K: KeySource + ?Sized>(&self, key: &[u8], keys: &K) -> Result<Probe, IndexError> {
        let size = self.slots.len();
        let home = self.home_slot(key);
        let mut i = home;
        loop {
            match self.slots[i] {
                None => return Ok(Probe::Vacant(i)),
                Some(id) if keys.key(id) == key => return Ok(Probe::Occupied(id)),
                Some(_) => {}
            }
            i += 1;
            if i == size {
                i = 0;
            }
            if i == home {
                return Err(IndexError::TableOverflow { size });
            }
        }
    }

    /// Fills a slot previously returned as [`Probe::Vacant`].
    pub fn occupy(&mut self, slot: usize, id: EntryId) {
        debug_assert!(self.slots[slot].is_none());
        self.slots[slot] = Some(id);
    }
}
