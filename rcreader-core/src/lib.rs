#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # RC Reader Core
//!
//! Interrupt-driven pulse width measurement for several RC receiver
//! channels at once. Pin-change interrupts feed a fixed-capacity channel
//! registry; handles apply timeout, range and hold-on-failure policy when
//! read.

pub mod types;
pub mod hal;
pub mod pins;
pub mod registry;
pub mod calculator;
pub mod dispatch;
pub mod reader;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use hal::{HalError, MicrosClock, NoOpPinChange, PinChangeControl, PortReader, EmbeddedHalPort};
#[cfg(feature = "embassy-time")]
pub use hal::EmbassyClock;
pub use pins::{group1_snapshot, Mega2560Port, PinRegister, RcPin, UnsupportedPin, MAX_CHANNELS};
pub use registry::{ChannelRegistry, RegistryError};
pub use calculator::{elapsed_micros, RcReaders};
pub use reader::RcReader;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Channel configuration with timeout and range checks disabled
pub const fn default_config() -> ChannelConfig {
    ChannelConfig::new()
}
