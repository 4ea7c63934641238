use std::fmt;

use fingerset_engine::{Bir, ReleaseBir};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{Origin, Record};

/// Number of slots in a template set.
pub const CAPACITY: usize = 16;

/// Stable identity of a slot. Stays valid while the slot is occupied, no
/// matter what happens to other slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotId(u8);

impl SlotId {
    pub fn new(index: usize) -> Result<Self> {
        if index < CAPACITY {
            Ok(Self(index as u8))
        } else {
            Err(Error::NoSuchSlot(index))
        }
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<u8> for SlotId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(usize::from(value))
    }
}

impl From<SlotId> for u8 {
    fn from(slot: SlotId) -> u8 {
        slot.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense view of the occupied slots, in ascending slot order.
///
/// `records()[i]` is the template held by `slots()[i]`.
#[derive(Debug)]
pub struct Compacted<'a> {
    records: Vec<&'a Bir>,
    slots: Vec<SlotId>,
}

impl<'a> Compacted<'a> {
    pub fn records(&self) -> &[&'a Bir] {
        &self.records
    }

    pub fn slots(&self) -> &[SlotId] {
        &self.slots
    }

    /// Translate a position in the dense view back to its slot.
    pub fn slot_at(&self, index: usize) -> Option<SlotId> {
        self.slots.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fixed-capacity table of enrolled templates.
pub struct Registry {
    slots: [Option<Record>; CAPACITY],
}

impl Registry {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Lowest empty slot. Does not reserve it.
    pub fn allocate(&self) -> Result<SlotId> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(Error::Full)?;
        SlotId::new(index)
    }

    /// Store `record` in an empty slot.
    ///
    /// # Panics
    ///
    /// If the slot is already occupied.
    pub fn place(&mut self, slot: SlotId, record: Record) {
        let cell = &mut self.slots[slot.index()];
        assert!(cell.is_none(), "slot {} is already enrolled", slot);
        debug!("slot {} <- {:?} template", slot, record.origin());
        *cell = Some(record);
    }

    pub fn get(&self, slot: SlotId) -> Result<&Record> {
        self.slots[slot.index()]
            .as_ref()
            .ok_or(Error::NotEnrolled(slot))
    }

    pub fn is_occupied(&self, slot: SlotId) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Release the record in `slot` and clear it.
    pub fn delete(&mut self, slot: SlotId, releaser: &mut dyn ReleaseBir) -> Result<()> {
        let record = self.slots[slot.index()]
            .take()
            .ok_or(Error::NotEnrolled(slot))?;
        record.release(releaser);
        Ok(())
    }

    /// Release every record. Returns how many slots were cleared.
    pub fn delete_all(&mut self, releaser: &mut dyn ReleaseBir) -> usize {
        let mut released = 0;
        for cell in self.slots.iter_mut() {
            if let Some(record) = cell.take() {
                record.release(releaser);
                released += 1;
            }
        }
        released
    }

    /// Occupied slots in ascending order. Cloning the iterator restarts it.
    pub fn list(&self) -> impl Iterator<Item = SlotId> + Clone + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_some())
            .map(|(index, _)| SlotId(index as u8))
    }

    /// Gap-free copy of the table for engine calls that take a template array.
    pub fn compact(&self) -> Compacted<'_> {
        let (slots, records) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.as_ref().map(|r| (SlotId(index as u8), r.bir())))
            .unzip();
        Compacted { records, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        let leaked = self
            .slots
            .iter()
            .flatten()
            .filter(|r| r.origin() == Origin::EngineAllocated)
            .count();
        if leaked > 0 {
            warn!(
                "template set dropped with {} engine template(s) never released",
                leaked
            );
        }
    }
}
