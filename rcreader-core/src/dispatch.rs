//! Interrupt dispatch glue
//!
//! Each group vector takes exactly one port snapshot and hands it to the
//! calculator for that group only.

use crate::calculator::RcReaders;
use crate::hal::{MicrosClock, PortReader};
use crate::types::InterruptGroup;

impl<C, const N: usize> RcReaders<C, N>
where
    C: MicrosClock,
{
    /// Handle one trigger of `group`'s interrupt vector.
    ///
    /// A failed port read drops the event; the next edge resynchronises the
    /// affected channels because levels are stored on every pass.
    pub fn on_group_interrupt<P>(&self, group: InterruptGroup, port: &mut P)
    where
        P: PortReader + ?Sized,
    {
        match port.read_group(group) {
            Ok(snapshot) => self.process_group(group, snapshot),
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("port read failed on {:?}: {:?}", group, _err);
            }
        }
    }

    /// Group 0 vector
    pub fn on_group0<P: PortReader + ?Sized>(&self, port: &mut P) {
        self.on_group_interrupt(InterruptGroup::Group0, port);
    }

    /// Group 1 vector
    pub fn on_group1<P: PortReader + ?Sized>(&self, port: &mut P) {
        self.on_group_interrupt(InterruptGroup::Group1, port);
    }

    /// Group 2 vector
    pub fn on_group2<P: PortReader + ?Sized>(&self, port: &mut P) {
        self.on_group_interrupt(InterruptGroup::Group2, port);
    }
}
