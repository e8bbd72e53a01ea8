//! Caller-facing channel handle and its read policy

use crate::calculator::{elapsed_micros, RcReaders};
use crate::hal::{MicrosClock, PinChangeControl};
use crate::pins::MAX_CHANNELS;
use crate::types::{
    ChannelConfig, ChannelPin, ChannelRecord, PinMapping, ReadError, ReadStatus, NO_READING,
};

/// One pulse width channel
///
/// Owns the read policy; the raw measurement lives in the shared registry
/// and is only ever copied out. Dropping the handle frees its slot.
pub struct RcReader<'r, C, const N: usize = MAX_CHANNELS>
where
    C: MicrosClock,
{
    readers: &'r RcReaders<C, N>,
    pin: PinMapping,
    /// Last known slot; `None` when attaching failed
    slot: Option<usize>,
    config: ChannelConfig,
    last_valid: u32,
}

impl<'r, C, const N: usize> RcReader<'r, C, N>
where
    C: MicrosClock,
{
    /// Register `pin` and arm its pin-change interrupt.
    ///
    /// Never fails outright: a full registry, a pin that is already taken
    /// or a refused interrupt leaves an inert handle whose every read
    /// reports [`ReadError::InitFailed`]. Check [`RcReader::is_attached`].
    pub fn new(
        readers: &'r RcReaders<C, N>,
        pin: impl ChannelPin,
        config: ChannelConfig,
        control: &mut impl PinChangeControl,
    ) -> Self {
        let pin = pin.mapping();
        Self {
            readers,
            pin,
            slot: Self::attach(readers, pin, control),
            config,
            last_valid: 0,
        }
    }

    fn attach(
        readers: &RcReaders<C, N>,
        pin: PinMapping,
        control: &mut impl PinChangeControl,
    ) -> Option<usize> {
        let registry = readers.registry();
        let index = match registry.add(pin, readers.clock().now_micros()) {
            Ok(index) => index,
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("pin {} not attached: {:?}", pin.id, _err);
                return None;
            }
        };

        if let Err(_err) = control.enable_pin_change(pin) {
            #[cfg(feature = "defmt")]
            defmt::warn!("pin {} interrupt setup failed: {:?}", pin.id, _err);
            registry.remove(index);
            return None;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("pin {} attached to slot {} ({:?})", pin.id, index, pin.group);
        Some(index)
    }

    /// Copy of this channel's record, following it through compaction
    pub fn raw_record(&mut self) -> Option<ChannelRecord> {
        let hint = self.slot?;
        let registry = self.readers.registry();
        if let Some(record) = registry.record(hint).filter(|r| r.pin == self.pin.id) {
            return Some(record);
        }
        let index = registry.position(self.pin.id)?;
        self.slot = Some(index);
        registry.record(index)
    }

    /// Detailed read.
    ///
    /// The error variants still carry a value: the stale raw duration on
    /// timeout, and on an out-of-range pulse either the last valid value
    /// (hold-on-failure) or the raw duration.
    pub fn read(&mut self) -> Result<u32, ReadError> {
        let record = self.raw_record().ok_or(ReadError::InitFailed)?;
        let raw = record.raw_duration;

        let since_edge = elapsed_micros(self.readers.clock().now_micros(), record.edge_start);
        if self.config.timeout_enabled() && since_edge / 1000 > self.config.timeout_ms {
            return Err(ReadError::Timeout(raw));
        }

        if self.config.accepts(raw) {
            self.last_valid = raw;
            Ok(raw)
        } else if self.config.hold_last_on_failure {
            Err(ReadError::InvalidValue(self.last_valid))
        } else {
            Err(ReadError::InvalidValue(raw))
        }
    }

    /// Simplified read: the pulse width, or `None` on a failure that
    /// hold-on-failure does not cover.
    ///
    /// With hold-on-failure set every failure carrying a value is passed
    /// through, including a timeout's stale raw duration.
    pub fn duration(&mut self) -> Option<u32> {
        match self.read() {
            Ok(micros) => Some(micros),
            Err(err) if self.config.hold_last_on_failure => err.value(),
            Err(_) => None,
        }
    }

    /// [`RcReader::duration`] with [`NO_READING`] (-1) standing in for `None`
    pub fn micros(&mut self) -> i32 {
        self.duration()
            .map_or(NO_READING, |micros| i32::try_from(micros).unwrap_or(i32::MAX))
    }

    pub fn status(&mut self) -> ReadStatus {
        ReadStatus::of(&self.read())
    }

    /// 0 disables timeout detection
    pub fn set_timeout(&mut self, timeout_ms: u32) {
        self.config.timeout_ms = timeout_ms;
    }

    /// `(0, 0)` disables range validation. The bounds are taken as given.
    pub fn set_valid_range(&mut self, min: u32, max: u32, hold_last_on_failure: bool) {
        self.config.valid_min = min;
        self.config.valid_max = max;
        self.config.hold_last_on_failure = hold_last_on_failure;
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn pin(&self) -> PinMapping {
        self.pin
    }

    pub fn is_attached(&self) -> bool {
        self.slot.is_some()
    }

    /// Most recent value that passed validation
    pub fn last_valid(&self) -> u32 {
        self.last_valid
    }
}

impl<'r, C, const N: usize> Drop for RcReader<'r, C, N>
where
    C: MicrosClock,
{
    fn drop(&mut self) {
        if self.raw_record().is_none() {
            return;
        }
        if let Some(index) = self.slot {
            self.readers.registry().remove(index);
            #[cfg(feature = "defmt")]
            defmt::debug!("pin {} detached from slot {}", self.pin.id, index);
        }
    }
}
