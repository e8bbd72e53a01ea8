//! Test utilities: a simulated receiver driving the reader through the
//! same dispatch path the interrupt handlers use

use core::cell::RefCell;

use crate::calculator::RcReaders;
use crate::hal::mock::{MockClock, MockPort};
use crate::hal::NoOpPinChange;
use crate::pins::MAX_CHANNELS;
use crate::reader::RcReader;
use crate::types::{ChannelConfig, ChannelPin};

/// Mock clock and port wired to a reader table
///
/// All methods take `&self` so handles borrowed from [`PulseBench::readers`]
/// can stay alive while the bench toggles lines.
pub struct PulseBench<const N: usize = MAX_CHANNELS> {
    readers: RcReaders<MockClock, N>,
    port: RefCell<MockPort>,
}

impl<const N: usize> PulseBench<N> {
    pub fn new(start_micros: u32) -> Self {
        Self {
            readers: RcReaders::new(MockClock::new(start_micros)),
            port: RefCell::new(MockPort::new()),
        }
    }

    pub fn readers(&self) -> &RcReaders<MockClock, N> {
        &self.readers
    }

    /// Attach a channel without any hardware setup
    pub fn attach(&self, pin: impl ChannelPin, config: ChannelConfig) -> RcReader<'_, MockClock, N> {
        RcReader::new(&self.readers, pin, config, &mut NoOpPinChange)
    }

    pub fn now(&self) -> u32 {
        use crate::hal::MicrosClock;
        self.readers.clock().now_micros()
    }

    pub fn set_time(&self, micros: u32) {
        self.readers.clock().set(micros);
    }

    pub fn advance_micros(&self, micros: u32) {
        self.readers.clock().advance(micros);
    }

    pub fn advance_millis(&self, millis: u32) {
        self.advance_micros(millis.saturating_mul(1000));
    }

    /// Drive a line and fire its group interrupt
    pub fn set_level(&self, pin: impl ChannelPin, high: bool) {
        let mapping = pin.mapping();
        let mut port = self.port.borrow_mut();
        port.set_level(mapping, high);
        self.readers.on_group_interrupt(mapping.group, &mut *port);
    }

    pub fn rise(&self, pin: impl ChannelPin) {
        self.set_level(pin, true);
    }

    pub fn fall(&self, pin: impl ChannelPin) {
        self.set_level(pin, false);
    }

    /// One complete high pulse of `width_micros`, ending low
    pub fn pulse(&self, pin: impl ChannelPin, width_micros: u32) {
        self.rise(pin);
        self.advance_micros(width_micros);
        self.fall(pin);
    }

    /// Number of port snapshots taken so far
    pub fn snapshots(&self) -> usize {
        self.port.borrow().reads()
    }
}
