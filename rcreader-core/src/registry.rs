//! Fixed-capacity channel registry shared with interrupt handlers
//!
//! Occupied slots always form a contiguous prefix, so the interrupt-side
//! scan stops at the first free slot. Structural changes (insert and the
//! compaction shift on removal) run inside a critical section; the scan
//! itself takes no lock.

use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::types::{ChannelRecord, InterruptGroup, PinMapping};

/// Registry mutation failures
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Every slot is taken
    Full,
    /// The pin already has a record
    PinInUse,
}

#[cfg(feature = "std")]
impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegistryError::Full => write!(f, "channel registry is full"),
            RegistryError::PinInUse => write!(f, "pin is already registered"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}

/// Interrupt-visible storage of one channel record
pub struct Slot {
    occupied: AtomicBool,
    pin: AtomicU8,
    group: AtomicU8,
    mask: AtomicU8,
    last_level: AtomicBool,
    edge_start: AtomicU32,
    raw_duration: AtomicU32,
}

impl Slot {
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Slot = Slot {
        occupied: AtomicBool::new(false),
        pin: AtomicU8::new(0),
        group: AtomicU8::new(0),
        mask: AtomicU8::new(0),
        last_level: AtomicBool::new(false),
        edge_start: AtomicU32::new(0),
        raw_duration: AtomicU32::new(0),
    };

    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Relaxed)
    }

    pub fn pin(&self) -> u8 {
        self.pin.load(Ordering::Relaxed)
    }

    /// Snapshot mask of the slot's line
    pub fn mask(&self) -> u8 {
        self.mask.load(Ordering::Relaxed)
    }

    pub fn last_level(&self) -> bool {
        self.last_level.load(Ordering::Relaxed)
    }

    pub fn edge_start(&self) -> u32 {
        self.edge_start.load(Ordering::Relaxed)
    }

    pub fn raw_duration(&self) -> u32 {
        self.raw_duration.load(Ordering::Relaxed)
    }

    fn group_index(&self) -> u8 {
        self.group.load(Ordering::Relaxed)
    }

    pub(crate) fn set_last_level(&self, level: bool) {
        self.last_level.store(level, Ordering::Relaxed);
    }

    pub(crate) fn set_edge_start(&self, micros: u32) {
        self.edge_start.store(micros, Ordering::Relaxed);
    }

    pub(crate) fn set_raw_duration(&self, micros: u32) {
        self.raw_duration.store(micros, Ordering::Relaxed);
    }

    fn fill(&self, pin: PinMapping, now: u32) {
        self.pin.store(pin.id, Ordering::Relaxed);
        self.group.store(pin.group.index(), Ordering::Relaxed);
        self.mask.store(pin.mask(), Ordering::Relaxed);
        self.last_level.store(false, Ordering::Relaxed);
        self.edge_start.store(now, Ordering::Relaxed);
        self.raw_duration.store(0, Ordering::Relaxed);
        self.occupied.store(true, Ordering::Relaxed);
    }

    fn copy_from(&self, other: &Slot) {
        self.pin.store(other.pin(), Ordering::Relaxed);
        self.group.store(other.group_index(), Ordering::Relaxed);
        self.mask.store(other.mask(), Ordering::Relaxed);
        self.last_level.store(other.last_level(), Ordering::Relaxed);
        self.edge_start.store(other.edge_start(), Ordering::Relaxed);
        self.raw_duration.store(other.raw_duration(), Ordering::Relaxed);
        self.occupied.store(other.is_occupied(), Ordering::Relaxed);
    }

    fn clear(&self) {
        self.occupied.store(false, Ordering::Relaxed);
        self.last_level.store(false, Ordering::Relaxed);
        self.raw_duration.store(0, Ordering::Relaxed);
    }

    fn record(&self) -> ChannelRecord {
        ChannelRecord {
            pin: self.pin(),
            group: InterruptGroup::from_index(self.group_index()).unwrap_or(InterruptGroup::Group0),
            last_level: self.last_level(),
            edge_start: self.edge_start(),
            raw_duration: self.raw_duration(),
        }
    }
}

/// Ordered table of channel records with a fixed capacity
pub struct ChannelRegistry<const N: usize> {
    slots: [Slot; N],
}

impl<const N: usize> ChannelRegistry<N> {
    pub const fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; N],
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().take_while(|slot| slot.is_occupied()).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.slots.first().is_some_and(Slot::is_occupied)
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Take the first free slot for `pin`, starting in the low state with
    /// its edge timestamp at `now` and no completed pulse.
    pub fn add(&self, pin: PinMapping, now: u32) -> Result<usize, RegistryError> {
        critical_section::with(|_| {
            for (index, slot) in self.slots.iter().enumerate() {
                if !slot.is_occupied() {
                    slot.fill(pin, now);
                    return Ok(index);
                }
                if slot.pin() == pin.id {
                    return Err(RegistryError::PinInUse);
                }
            }
            Err(RegistryError::Full)
        })
    }

    /// Release the record at `index` and shift every later record down by
    /// one. Returns the released record, or `None` for a free index.
    pub fn remove(&self, index: usize) -> Option<ChannelRecord> {
        critical_section::with(|_| {
            let removed = self.slots.get(index).filter(|slot| slot.is_occupied())?.record();

            let mut next = index + 1;
            while next < N && self.slots[next].is_occupied() {
                self.slots[next - 1].copy_from(&self.slots[next]);
                next += 1;
            }
            self.slots[next - 1].clear();

            Some(removed)
        })
    }

    /// Consistent copy of the record at `index`
    pub fn record(&self, index: usize) -> Option<ChannelRecord> {
        critical_section::with(|_| {
            self.slots
                .get(index)
                .filter(|slot| slot.is_occupied())
                .map(Slot::record)
        })
    }

    /// Current slot of `pin_id`
    pub fn position(&self, pin_id: u8) -> Option<usize> {
        self.slots
            .iter()
            .take_while(|slot| slot.is_occupied())
            .position(|slot| slot.pin() == pin_id)
    }

    /// Visit every occupied slot of `group`, front to back, stopping at the
    /// end of the occupied prefix. Safe to call from interrupt context.
    pub fn for_each_in_group(&self, group: InterruptGroup, mut visit: impl FnMut(&Slot)) {
        let group = group.index();
        for slot in self.slots.iter() {
            if !slot.is_occupied() {
                return;
            }
            if slot.group_index() == group {
                visit(slot);
            }
        }
    }
}

impl<const N: usize> Default for ChannelRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}
