#![no_std]

//! Firmware library: CH32V203 pin-change wiring and monitor tasks

pub use embassy_time::Duration;

pub use rc_reader_core::*;

pub use crate::ch32v203_hardware::*;
#[cfg(feature = "hardware")]
pub use crate::tasks::*;

/// Timeout and range applied to every channel on this board
pub const BOARD_CONFIG: ChannelConfig = ChannelConfig::new()
    .with_timeout(100)
    .with_valid_range(900, 2100, true);

/// Interval between channel reports
pub const REPORT_INTERVAL: Duration = Duration::from_millis(50);

// Embassy tasks module
#[cfg(feature = "hardware")]
pub mod tasks {
    use super::*;

    /// Periodically read every channel and log the result
    #[embassy_executor::task]
    pub async fn monitor_task(mut channels: [BoardReader; 3]) {
        #[cfg(feature = "defmt")]
        defmt::info!("📡 Monitor task started");

        loop {
            for (_index, channel) in channels.iter_mut().enumerate() {
                let _status = channel.status();
                let _micros = channel.micros();
                #[cfg(feature = "defmt")]
                defmt::info!("ch{}: {} us ({:?})", _index, _micros, _status);
            }
            embassy_time::Timer::after(REPORT_INTERVAL).await;
        }
    }
}

// CH32V203 hardware module
pub mod ch32v203_hardware;

// SysTick timebase arithmetic
pub mod timebase;

// Time driver for embassy
#[cfg(target_arch = "riscv32")]
pub mod time_driver;
