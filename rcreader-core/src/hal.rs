//! Hardware primitives consumed by the reader
//!
//! The core never touches registers. A board provides a microsecond
//! counter, a bulk port read per interrupt group and pin-change
//! registration; global interrupt masking goes through `critical-section`.

use embedded_hal::digital::InputPin;
use heapless::Vec;

use crate::types::{ChannelPin, InterruptGroup, PinMapping};

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO read or configuration failed
    GpioError,
    /// Interrupt configuration failed
    InterruptError,
    /// Pin is not wired to any pin-change interrupt
    UnsupportedPin,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::InterruptError => write!(f, "Interrupt configuration failed"),
            HalError::UnsupportedPin => write!(f, "Pin has no pin-change interrupt"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Free-running microsecond counter that wraps at `u32::MAX`
pub trait MicrosClock {
    fn now_micros(&self) -> u32;
}

/// Bulk read of every line in one interrupt group
pub trait PortReader {
    /// Sample all lines of `group` at once; bit `n` is the line mapped to bit `n`.
    fn read_group(&mut self, group: InterruptGroup) -> Result<u8, HalError>;
}

/// Pin-change interrupt registration
pub trait PinChangeControl {
    /// Configure the line as a pulled-up input and unmask it in its group
    fn enable_pin_change(&mut self, pin: PinMapping) -> Result<(), HalError>;
}

/// Clock backed by the embassy time driver
///
/// Requires a driver ticking at 1 MHz; the 64-bit instant is truncated so
/// the value wraps like a hardware `micros()` counter.
#[cfg(feature = "embassy-time")]
#[derive(Copy, Clone, Debug, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl MicrosClock for EmbassyClock {
    fn now_micros(&self) -> u32 {
        embassy_time::Instant::now().as_micros() as u32
    }
}

/// Pin-change control for simulations where lines need no setup
pub struct NoOpPinChange;

impl PinChangeControl for NoOpPinChange {
    fn enable_pin_change(&mut self, _pin: PinMapping) -> Result<(), HalError> {
        Ok(())
    }
}

/// Port reader assembled from individual embedded-hal input pins
///
/// Lines are polled one after another, so the snapshot is only as
/// consistent as the pins' read latency allows. Prefer a register-level
/// reader where the hardware offers one.
pub struct EmbeddedHalPort<P, const N: usize = 8> {
    lines: Vec<(PinMapping, P), N>,
}

impl<P, const N: usize> EmbeddedHalPort<P, N>
where
    P: InputPin,
{
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Attach `line` as the input behind `pin`. Returns the line back when full.
    pub fn add_line(&mut self, pin: impl ChannelPin, line: P) -> Result<(), P> {
        self.lines
            .push((pin.mapping(), line))
            .map_err(|(_, line)| line)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

impl<P, const N: usize> Default for EmbeddedHalPort<P, N>
where
    P: InputPin,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, const N: usize> PortReader for EmbeddedHalPort<P, N>
where
    P: InputPin,
{
    fn read_group(&mut self, group: InterruptGroup) -> Result<u8, HalError> {
        let mut snapshot = 0u8;
        for (mapping, line) in self.lines.iter_mut() {
            if mapping.group != group {
                continue;
            }
            if line.is_high().map_err(|_| HalError::GpioError)? {
                snapshot |= mapping.mask();
            }
        }
        Ok(snapshot)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use crate::types::GROUP_COUNT;
    use portable_atomic::{AtomicU32, Ordering};

    /// Settable microsecond counter
    #[derive(Debug, Default)]
    pub struct MockClock {
        now: AtomicU32,
    }

    impl MockClock {
        pub const fn new(start: u32) -> Self {
            Self {
                now: AtomicU32::new(start),
            }
        }

        pub fn set(&self, micros: u32) {
            self.now.store(micros, Ordering::Relaxed);
        }

        /// Advance with the same wraparound as the hardware counter
        pub fn advance(&self, micros: u32) {
            let now = self.now.load(Ordering::Relaxed);
            self.now.store(now.wrapping_add(micros), Ordering::Relaxed);
        }
    }

    impl MicrosClock for MockClock {
        fn now_micros(&self) -> u32 {
            self.now.load(Ordering::Relaxed)
        }
    }

    /// Port levels held in memory, one byte per group
    #[derive(Debug, Default)]
    pub struct MockPort {
        levels: [u8; GROUP_COUNT],
        fail_reads: bool,
        reads: usize,
    }

    impl MockPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_level(&mut self, pin: impl ChannelPin, high: bool) {
            let mapping = pin.mapping();
            let byte = &mut self.levels[mapping.group.index() as usize];
            if high {
                *byte |= mapping.mask();
            } else {
                *byte &= !mapping.mask();
            }
        }

        pub fn set_fail_reads(&mut self, fail: bool) {
            self.fail_reads = fail;
        }

        /// Number of snapshots taken so far
        pub fn reads(&self) -> usize {
            self.reads
        }
    }

    impl PortReader for MockPort {
        fn read_group(&mut self, group: InterruptGroup) -> Result<u8, HalError> {
            if self.fail_reads {
                return Err(HalError::GpioError);
            }
            self.reads += 1;
            Ok(self.levels[group.index() as usize])
        }
    }

    /// Records every registration; can be told to refuse them
    #[derive(Debug, Default)]
    pub struct MockPinChange {
        enabled: Vec<PinMapping, 32>,
        refuse: bool,
    }

    impl MockPinChange {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_refuse(&mut self, refuse: bool) {
            self.refuse = refuse;
        }

        pub fn enabled(&self) -> &[PinMapping] {
            &self.enabled
        }
    }

    impl PinChangeControl for MockPinChange {
        fn enable_pin_change(&mut self, pin: PinMapping) -> Result<(), HalError> {
            if self.refuse {
                return Err(HalError::InterruptError);
            }
            self.enabled.push(pin).map_err(|_| HalError::InterruptError)
        }
    }
}
