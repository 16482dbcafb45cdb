//! Direct-address table keyed by call handles.
//!
//! Each handle lives in slot `handle % len`. Lookups are a single modulo
//! and compare. When a new handle lands on a slot held by a different
//! handle, the table grows to the smallest length at which every stored
//! handle and the new one fall into distinct slots. Growth happens only on
//! such a collision, and the table never holds two handles in one slot.

use crate::utils::config::INITIAL_CHILD_TABLE_LEN;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Opaque identity of a traced callee.
///
/// Zero is reserved and cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallHandle(NonZeroU64);

impl CallHandle {
    /// `None` for the reserved handle 0
    pub fn new(raw: u64) -> Option<CallHandle> {
        NonZeroU64::new(raw).map(CallHandle)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

/// Growable, collision-free map from call handles to values
#[derive(Debug, Clone)]
pub struct HandleTable<V> {
    slots: Vec<Option<(CallHandle, V)>>,
}

impl<V> Default for HandleTable<V> {
    fn default() -> Self {
        Self::with_len(INITIAL_CHILD_TABLE_LEN)
    }
}

impl<V> HandleTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with `len` empty slots (at least one)
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: (0..len.max(1)).map(|_| None).collect(),
        }
    }

    /// Number of slots, occupied or not
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of stored handles
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Slot a handle maps to at the current length
    pub fn slot_of(&self, handle: CallHandle) -> usize {
        slot_for(handle.get(), self.slots.len())
    }

    pub fn get(&self, handle: CallHandle) -> Option<&V> {
        match &self.slots[self.slot_of(handle)] {
            Some((stored, value)) if *stored == handle => Some(value),
            _ => None,
        }
    }

    /// Value stored for `handle`, inserting `make()` on first sight.
    ///
    /// Grows the table if `handle` collides with a different stored handle.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, handle: CallHandle, make: F) -> &mut V {
        let mut slot = self.slot_of(handle);
        if matches!(&self.slots[slot], Some((stored, _)) if *stored != handle) {
            slot = self.rebuild(handle);
        }
        &mut self.slots[slot].get_or_insert_with(|| (handle, make())).1
    }

    /// Stored entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (CallHandle, &V)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(handle, value)| (*handle, value)))
    }

    /// Handle held by each slot, `None` for free slots
    pub fn slots(&self) -> impl Iterator<Item = Option<CallHandle>> + '_ {
        self.slots.iter().map(|slot| slot.as_ref().map(|(handle, _)| *handle))
    }

    /// Grow to the smallest collision-free length and return the new
    /// handle's slot there
    fn rebuild(&mut self, new_handle: CallHandle) -> usize {
        let mut keys: Vec<u64> = self.iter().map(|(handle, _)| handle.get()).collect();
        keys.push(new_handle.get());

        let mut len = self.slots.len();
        let mut taken = Vec::new();
        loop {
            len += 1;
            taken.clear();
            taken.resize(len, false);
            let distinct = keys
                .iter()
                .all(|key| !std::mem::replace(&mut taken[slot_for(*key, len)], true));
            if distinct {
                break;
            }
        }

        let mut slots: Vec<Option<(CallHandle, V)>> = (0..len).map(|_| None).collect();
        for (handle, value) in self.slots.drain(..).flatten() {
            slots[slot_for(handle.get(), len)] = Some((handle, value));
        }
        self.slots = slots;

        debug!(
            "Rebuilt handle table: {} handles in {} slots",
            keys.len(),
            len
        );

        slot_for(new_handle.get(), len)
    }
}

fn slot_for(key: u64, len: usize) -> usize {
    (key % len as u64) as usize
}
