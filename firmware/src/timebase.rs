//! SysTick timebase arithmetic shared by the time driver

/// 144 MHz HCLK, SysTick on HCLK/8
pub const SYSTICK_PER_MICRO: u64 = 18;

/// Closest an alarm compare is placed ahead of the current time. Covers the
/// register writes between the `now` check and arming the compare.
pub const MIN_ALARM_LEAD_MICROS: u64 = 10;

/// Embassy ticks (µs) for a raw SysTick count
pub const fn micros_from_count(count: u64) -> u64 {
    count / SYSTICK_PER_MICRO
}

/// SysTick compare value for an alarm at `timestamp`, never closer than
/// [`MIN_ALARM_LEAD_MICROS`] to `now`. Firing late is allowed, early is not.
pub const fn alarm_compare_count(timestamp: u64, now: u64) -> u64 {
    let earliest = now.saturating_add(MIN_ALARM_LEAD_MICROS);
    let target = if timestamp > earliest { timestamp } else { earliest };
    target.saturating_mul(SYSTICK_PER_MICRO)
}
