#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// RISC-V runtime
use riscv_rt as _;

// Panic handler
use panic_halt as _;

use embassy_executor::Spawner;
use embassy_time::Duration;

use rc_reader_firmware::*;

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("🔧 RC Reader Firmware Starting... v{}", VERSION);

    init_clocks();
    time_driver::init();
    #[cfg(feature = "defmt")]
    defmt::info!("✅ Clocks and SysTick initialized");

    // Throttle, aileron and elevator: one line in each interrupt group
    let channels = [
        attach(Ch32Pin::PA0, BOARD_CONFIG),
        attach(Ch32Pin::PA5, BOARD_CONFIG),
        attach(Ch32Pin::PB10, BOARD_CONFIG),
    ];
    #[cfg(feature = "defmt")]
    defmt::info!(
        "⚙️ {} of {} channels attached",
        channels.iter().filter(|c| c.is_attached()).count(),
        BOARD_CHANNELS
    );

    spawner.must_spawn(monitor_task(channels));

    #[cfg(feature = "defmt")]
    defmt::info!("✨ RC reader ready!");

    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
        #[cfg(feature = "defmt")]
        defmt::trace!("💓 Heartbeat");
    }
}

// Interrupt vectors

#[no_mangle]
extern "C" fn EXTI0() {
    on_exti4_0();
}

#[no_mangle]
extern "C" fn EXTI1() {
    on_exti4_0();
}

#[no_mangle]
extern "C" fn EXTI2() {
    on_exti4_0();
}

#[no_mangle]
extern "C" fn EXTI3() {
    on_exti4_0();
}

#[no_mangle]
extern "C" fn EXTI4() {
    on_exti4_0();
}

#[no_mangle]
extern "C" fn EXTI9_5() {
    on_exti9_5();
}

#[no_mangle]
extern "C" fn EXTI15_10() {
    on_exti15_10();
}

#[no_mangle]
extern "C" fn SysTick() {
    time_driver::on_systick();
}
