//! Edge detection and pulse duration calculation
//!
//! Runs from the group interrupt handlers. One call processes every
//! channel of one group against a single port snapshot.

use crate::hal::MicrosClock;
use crate::pins::MAX_CHANNELS;
use crate::registry::{ChannelRegistry, Slot};
use crate::types::InterruptGroup;

/// Microseconds from `earlier` to `now` on a wrapping 32-bit counter
#[inline]
pub const fn elapsed_micros(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier)
}

/// Channel registry plus the clock its timestamps come from
///
/// Meant to live in a `static` so the interrupt handlers and the
/// [`RcReader`](crate::reader::RcReader) handles see the same table.
pub struct RcReaders<C, const N: usize = MAX_CHANNELS> {
    registry: ChannelRegistry<N>,
    clock: C,
}

impl<C, const N: usize> RcReaders<C, N>
where
    C: MicrosClock,
{
    pub const fn new(clock: C) -> Self {
        Self {
            registry: ChannelRegistry::new(),
            clock,
        }
    }

    pub fn registry(&self) -> &ChannelRegistry<N> {
        &self.registry
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Apply one port snapshot of `group` to its channels.
    ///
    /// Rising edges stamp the start time, falling edges commit the high
    /// interval. The level is stored unconditionally so a missed edge
    /// cannot leave the channel out of step with the line.
    pub fn process_group(&self, group: InterruptGroup, snapshot: u8) {
        #[cfg(feature = "mask-during-calculation")]
        critical_section::with(|_| self.apply_snapshot(group, snapshot));

        #[cfg(not(feature = "mask-during-calculation"))]
        self.apply_snapshot(group, snapshot);
    }

    fn apply_snapshot(&self, group: InterruptGroup, snapshot: u8) {
        let now = self.clock.now_micros();
        self.registry
            .for_each_in_group(group, |slot| update_slot(slot, snapshot, now));
    }
}

#[inline]
fn update_slot(slot: &Slot, snapshot: u8, now: u32) {
    let level = snapshot & slot.mask() != 0;
    match (slot.last_level(), level) {
        (false, true) => slot.set_edge_start(now),
        (true, false) => slot.set_raw_duration(elapsed_micros(now, slot.edge_start())),
        _ => {}
    }
    slot.set_last_level(level);
}
