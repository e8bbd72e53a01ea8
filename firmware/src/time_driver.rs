//! SysTick based embassy time driver for CH32V203
//!
//! SysTick counts HCLK/8 as a free-running 64-bit counter. One tick of the
//! embassy timebase is one microsecond, so the counter is divided by
//! [`SYSTICK_PER_MICRO`](crate::timebase::SYSTICK_PER_MICRO). The compare
//! register drives the single alarm, armed at least
//! [`MIN_ALARM_LEAD_MICROS`](crate::timebase::MIN_ALARM_LEAD_MICROS) ahead.

use core::cell::Cell;

use critical_section::CriticalSection;
use embassy_sync::blocking_mutex::CriticalSectionMutex as Mutex;
use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicBool, Ordering};

use crate::timebase::{alarm_compare_count, micros_from_count};

const STK_BASE: u32 = 0xE000_F000;
const STK_CTLR: u32 = 0x00;
const STK_SR: u32 = 0x04;
const STK_CNTL: u32 = 0x08;
const STK_CNTH: u32 = 0x0C;
const STK_CMPLR: u32 = 0x10;
const STK_CMPHR: u32 = 0x14;

const CTLR_STE: u32 = 1 << 0;
const CTLR_STIE: u32 = 1 << 1;

/// PFIC interrupt number of SysTick
const SYSTICK_IRQ: u32 = 12;
const PFIC_IENR1: u32 = 0xE000_E100;

struct AlarmState {
    timestamp: Cell<u64>,
    callback: Cell<Option<(fn(*mut ()), *mut ())>>,
}

unsafe impl Send for AlarmState {}

impl AlarmState {
    const fn new() -> Self {
        Self {
            timestamp: Cell::new(u64::MAX),
            callback: Cell::new(None),
        }
    }
}

pub struct SysTickDriver {
    alarm_taken: AtomicBool,
    alarm: Mutex<AlarmState>,
}

impl SysTickDriver {
    const fn new() -> Self {
        Self {
            alarm_taken: AtomicBool::new(false),
            alarm: Mutex::new(AlarmState::new()),
        }
    }

    fn init(&self) {
        unsafe {
            write_reg(STK_BASE + STK_CTLR, 0);
            write_reg(STK_BASE + STK_CNTL, 0);
            write_reg(STK_BASE + STK_CNTH, 0);
            write_reg(STK_BASE + STK_CMPLR, u32::MAX);
            write_reg(STK_BASE + STK_CMPHR, u32::MAX);
            write_reg(STK_BASE + STK_SR, 0);
            // HCLK/8 clock source, count up
            write_reg(STK_BASE + STK_CTLR, CTLR_STE);
            write_reg(PFIC_IENR1, 1 << SYSTICK_IRQ);
        }
        #[cfg(feature = "defmt")]
        defmt::info!("SysTick time driver running");
    }

    fn raw_count(&self) -> u64 {
        // Re-read the high word to catch a carry between the two halves
        loop {
            let high = unsafe { read_reg(STK_BASE + STK_CNTH) };
            let low = unsafe { read_reg(STK_BASE + STK_CNTL) };
            if high == unsafe { read_reg(STK_BASE + STK_CNTH) } {
                return (u64::from(high) << 32) | u64::from(low);
            }
        }
    }

    /// Arm the compare for `timestamp`. Returns false when the counter
    /// already passed the compare value by the time it was armed.
    fn program_compare(&self, timestamp: u64) -> bool {
        let target = alarm_compare_count(timestamp, self.now());
        unsafe {
            write_reg(STK_BASE + STK_CMPLR, target as u32);
            write_reg(STK_BASE + STK_CMPHR, (target >> 32) as u32);
            write_reg(STK_BASE + STK_SR, 0);
            write_reg(STK_BASE + STK_CTLR, read_reg(STK_BASE + STK_CTLR) | CTLR_STIE);
        }
        self.raw_count() < target
    }

    fn disarm(&self) {
        unsafe {
            write_reg(STK_BASE + STK_CTLR, read_reg(STK_BASE + STK_CTLR) & !CTLR_STIE);
            write_reg(STK_BASE + STK_SR, 0);
        }
    }

    fn trigger_alarm(&self, cs: CriticalSection) {
        let alarm = self.alarm.borrow(cs);
        alarm.timestamp.set(u64::MAX);
        if let Some((callback, ctx)) = alarm.callback.get() {
            callback(ctx);
        }
    }

    fn on_interrupt(&self) {
        critical_section::with(|cs| {
            self.disarm();
            let alarm = self.alarm.borrow(cs);
            if alarm.timestamp.get() <= self.now() {
                self.trigger_alarm(cs);
            } else if alarm.timestamp.get() != u64::MAX {
                // Fired early after a compare rewrite; re-arm
                if !self.program_compare(alarm.timestamp.get()) {
                    self.disarm();
                    self.trigger_alarm(cs);
                }
            }
        });
    }
}

impl Driver for SysTickDriver {
    fn now(&self) -> u64 {
        micros_from_count(self.raw_count())
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        if self.alarm_taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(AlarmHandle::new(0))
        }
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, callback: fn(*mut ()), ctx: *mut ()) {
        critical_section::with(|cs| {
            self.alarm.borrow(cs).callback.set(Some((callback, ctx)));
        });
    }

    fn set_alarm(&self, _alarm: AlarmHandle, timestamp: u64) -> bool {
        critical_section::with(|cs| {
            let alarm = self.alarm.borrow(cs);
            if timestamp <= self.now() {
                alarm.timestamp.set(u64::MAX);
                self.disarm();
                return false;
            }
            alarm.timestamp.set(timestamp);
            if !self.program_compare(timestamp) {
                alarm.timestamp.set(u64::MAX);
                self.disarm();
                return false;
            }
            true
        })
    }
}

#[inline]
unsafe fn read_reg(addr: u32) -> u32 {
    core::ptr::read_volatile(addr as *const u32)
}

#[inline]
unsafe fn write_reg(addr: u32, value: u32) {
    core::ptr::write_volatile(addr as *mut u32, value);
}

embassy_time_driver::time_driver_impl!(static DRIVER: SysTickDriver = SysTickDriver::new());

/// Start the SysTick counter; call once before the executor runs
pub fn init() {
    DRIVER.init();
}

/// Body of the SysTick vector
pub fn on_systick() {
    DRIVER.on_interrupt();
}

// Critical section implementation for single-core RISC-V
critical_section::set_impl!(RiscvCriticalSection);

struct RiscvCriticalSection;

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> u8 {
        let mut mstatus: usize;
        core::arch::asm!("csrrci {}, mstatus, 8", out(reg) mstatus);
        (mstatus & 8) as u8
    }

    unsafe fn release(was_active: u8) {
        if was_active != 0 {
            core::arch::asm!("csrsi mstatus, 8");
        }
    }
}
