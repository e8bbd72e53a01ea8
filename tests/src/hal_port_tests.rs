//! embedded-hal backed port reads and the embassy clock

use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction};
use rc_reader_core::hal::mock::MockClock;
use rc_reader_core::*;

const NO_READS: [Transaction; 0] = [];

#[test]
fn test_group_snapshot_from_input_pins() {
    // D53 and D51 are group 0 bits 0 and 2; A8 sits in group 2
    let d53 = PinMock::new(&[Transaction::get(State::High)]);
    let d51 = PinMock::new(&[Transaction::get(State::Low)]);
    let a8 = PinMock::new(&NO_READS);
    let (mut d53_check, mut d51_check, mut a8_check) = (d53.clone(), d51.clone(), a8.clone());

    let mut port: EmbeddedHalPort<PinMock, 4> = EmbeddedHalPort::new();
    assert!(port.add_line(RcPin::D53, d53).is_ok());
    assert!(port.add_line(RcPin::D51, d51).is_ok());
    assert!(port.add_line(RcPin::A8, a8).is_ok());
    assert_eq!(port.line_count(), 3);

    assert_eq!(port.read_group(InterruptGroup::Group0), Ok(0b0000_0001));

    d53_check.done();
    d51_check.done();
    a8_check.done();
}

#[test]
fn test_full_port_returns_line() {
    let mut port: EmbeddedHalPort<PinMock, 1> = EmbeddedHalPort::new();
    let first = PinMock::new(&NO_READS);
    let mut first_check = first.clone();
    assert!(port.add_line(RcPin::D10, first).is_ok());

    let rejected = port.add_line(RcPin::D11, PinMock::new(&NO_READS));
    match rejected {
        Err(mut line) => line.done(),
        Ok(()) => panic!("second line accepted by a one-line port"),
    }
    assert_eq!(port.line_count(), 1);
    first_check.done();
}

#[test]
fn test_pulse_measured_through_input_pins() {
    let line = PinMock::new(&[
        Transaction::get(State::High),
        Transaction::get(State::Low),
    ]);
    let mut check = line.clone();
    let mut port: EmbeddedHalPort<PinMock> = EmbeddedHalPort::new();
    assert!(port.add_line(RcPin::A12, line).is_ok());

    let readers: RcReaders<MockClock, 2> = RcReaders::new(MockClock::new(100));
    let mut reader = RcReader::new(&readers, RcPin::A12, ChannelConfig::default(), &mut NoOpPinChange);

    readers.on_group2(&mut port);
    readers.clock().advance(1_750);
    readers.on_group2(&mut port);

    assert_eq!(reader.read(), Ok(1_750));
    check.done();
}

#[test]
fn test_embassy_clock_follows_driver() {
    let driver = embassy_time::MockDriver::get();
    let before = EmbassyClock.now_micros();
    driver.advance(embassy_time::Duration::from_micros(2_500));
    assert_eq!(elapsed_micros(EmbassyClock.now_micros(), before), 2_500);
}
