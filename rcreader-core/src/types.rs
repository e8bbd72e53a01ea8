//! Core data types for the pulse width reader

/// Number of hardware interrupt groups
pub const GROUP_COUNT: usize = 3;

/// Value returned by the simplified read API when a failure is not held over
pub const NO_READING: i32 = -1;

/// Hardware interrupt group: one vector, one port-level register read
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InterruptGroup {
    Group0 = 0,
    Group1 = 1,
    Group2 = 2,
}

impl InterruptGroup {
    /// All groups in vector order
    pub const ALL: [InterruptGroup; GROUP_COUNT] = [
        InterruptGroup::Group0,
        InterruptGroup::Group1,
        InterruptGroup::Group2,
    ];

    /// Numeric group id as stored in the registry
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`InterruptGroup::index`]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(InterruptGroup::Group0),
            1 => Some(InterruptGroup::Group1),
            2 => Some(InterruptGroup::Group2),
            _ => None,
        }
    }
}

/// Where a physical input line shows up in its group's port snapshot
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMapping {
    /// Board-level pin identifier (unique per board table)
    pub id: u8,
    /// Interrupt group serving this line
    pub group: InterruptGroup,
    /// Bit position inside the group snapshot (0-7)
    pub bit: u8,
}

impl PinMapping {
    pub const fn new(id: u8, group: InterruptGroup, bit: u8) -> Self {
        Self { id, group, bit }
    }

    /// Snapshot mask for this line
    pub const fn mask(&self) -> u8 {
        1 << (self.bit & 0x07)
    }
}

/// A board pin that can be turned into a [`PinMapping`]
pub trait ChannelPin: Copy {
    fn mapping(self) -> PinMapping;
}

impl ChannelPin for PinMapping {
    fn mapping(self) -> PinMapping {
        self
    }
}

/// Edge tracking state of one channel
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeState {
    /// Line is low, next rising edge starts a measurement
    WaitingForRise,
    /// Line is high, next falling edge commits the duration
    MeasuringHigh,
}

impl EdgeState {
    pub const fn from_level(high: bool) -> Self {
        if high {
            EdgeState::MeasuringHigh
        } else {
            EdgeState::WaitingForRise
        }
    }
}

/// Copy of one registry slot, taken atomically with respect to interrupts
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRecord {
    /// Board pin identifier
    pub pin: u8,
    /// Interrupt group of the pin
    pub group: InterruptGroup,
    /// Last observed level (true = high)
    pub last_level: bool,
    /// Counter value at the most recent rising edge
    pub edge_start: u32,
    /// Last completed high interval in microseconds
    pub raw_duration: u32,
}

impl ChannelRecord {
    /// Current position in the rise/fall cycle
    pub const fn edge_state(&self) -> EdgeState {
        EdgeState::from_level(self.last_level)
    }
}

/// Per-channel read policy
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Inactivity threshold in milliseconds (0 = disabled)
    pub timeout_ms: u32,
    /// Inclusive lower bound of a valid pulse in microseconds
    pub valid_min: u32,
    /// Inclusive upper bound of a valid pulse in microseconds
    pub valid_max: u32,
    /// Substitute the last valid value when a read fails
    pub hold_last_on_failure: bool,
}

impl ChannelConfig {
    /// Timeout and range validation disabled
    pub const fn new() -> Self {
        Self {
            timeout_ms: 0,
            valid_min: 0,
            valid_max: 0,
            hold_last_on_failure: false,
        }
    }

    pub const fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// `min > max` is accepted as given; such a range never validates.
    pub const fn with_valid_range(mut self, min: u32, max: u32, hold_last_on_failure: bool) -> Self {
        self.valid_min = min;
        self.valid_max = max;
        self.hold_last_on_failure = hold_last_on_failure;
        self
    }

    pub const fn timeout_enabled(&self) -> bool {
        self.timeout_ms != 0
    }

    /// `(0, 0)` turns range validation off
    pub const fn range_check_enabled(&self) -> bool {
        !(self.valid_min == 0 && self.valid_max == 0)
    }

    /// True if `micros` passes range validation
    pub const fn accepts(&self, micros: u32) -> bool {
        !self.range_check_enabled() || (micros >= self.valid_min && micros <= self.valid_max)
    }
}

/// Status codes of the detailed read
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadStatus {
    Ok,
    InvalidValue,
    Timeout,
    InitFailed,
}

/// Failed read; carries the value the detailed API still reports
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// Raw duration outside the valid range. Holds the last valid value when
    /// hold-on-failure is set, the raw duration otherwise.
    InvalidValue(u32),
    /// No rising edge within the timeout. Holds the raw (stale) duration.
    Timeout(u32),
    /// The channel never got a registry slot
    InitFailed,
}

impl ReadError {
    /// Value reported alongside the failure, if any
    pub const fn value(&self) -> Option<u32> {
        match self {
            ReadError::InvalidValue(v) | ReadError::Timeout(v) => Some(*v),
            ReadError::InitFailed => None,
        }
    }

    pub const fn status(&self) -> ReadStatus {
        match self {
            ReadError::InvalidValue(_) => ReadStatus::InvalidValue,
            ReadError::Timeout(_) => ReadStatus::Timeout,
            ReadError::InitFailed => ReadStatus::InitFailed,
        }
    }
}

impl ReadStatus {
    pub fn of(result: &Result<u32, ReadError>) -> Self {
        match result {
            Ok(_) => ReadStatus::Ok,
            Err(e) => e.status(),
        }
    }
}

#[cfg(feature = "std")]
impl core::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadError::InvalidValue(v) => write!(f, "pulse width out of range ({v} us reported)"),
            ReadError::Timeout(v) => write!(f, "no pulse within timeout ({v} us reported)"),
            ReadError::InitFailed => write!(f, "channel was not registered"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReadError {}
