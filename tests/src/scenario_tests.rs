//! Table-driven read policy scenarios

use rc_reader_core::test_utils::PulseBench;
use rc_reader_core::*;
use rstest::rstest;

/// One pulse, then a read under the given range and hold settings
#[rstest]
#[case::inside_range(1000, 2000, false, 1_500, Ok(1_500))]
#[case::lower_bound_inclusive(1000, 2000, false, 1_000, Ok(1_000))]
#[case::upper_bound_inclusive(1000, 2000, false, 2_000, Ok(2_000))]
#[case::below_range(1000, 2000, false, 999, Err(ReadError::InvalidValue(999)))]
#[case::above_range(1000, 2000, false, 2_001, Err(ReadError::InvalidValue(2_001)))]
#[case::disabled_range(0, 0, false, 37, Ok(37))]
#[case::hold_without_history(1000, 2000, true, 3_000, Err(ReadError::InvalidValue(0)))]
fn test_single_pulse_against_range(
    #[case] min: u32,
    #[case] max: u32,
    #[case] hold: bool,
    #[case] width: u32,
    #[case] expected: Result<u32, ReadError>,
) {
    let bench: PulseBench = PulseBench::new(5_000);
    let mut reader = bench.attach(RcPin::A15, ChannelConfig::new().with_valid_range(min, max, hold));

    bench.pulse(RcPin::A15, width);
    assert_eq!(reader.read(), expected);
    assert_eq!(reader.status(), ReadStatus::of(&expected));
}

#[rstest]
#[case::no_hold(false, None, NO_READING)]
#[case::hold(true, Some(1_250), 1_250)]
fn test_simplified_read_after_glitch(
    #[case] hold: bool,
    #[case] duration: Option<u32>,
    #[case] micros: i32,
) {
    let bench: PulseBench = PulseBench::new(0);
    let mut reader = bench.attach(RcPin::D14, ChannelConfig::new().with_valid_range(1000, 2000, hold));

    bench.pulse(RcPin::D14, 1_250);
    assert_eq!(reader.duration(), Some(1_250));

    bench.advance_micros(18_000);
    bench.pulse(RcPin::D14, 80);
    assert_eq!(reader.duration(), duration);
    assert_eq!(reader.micros(), micros);
}

#[rstest]
#[case(0, 1_000_000, ReadStatus::Ok)]
#[case(20, 20_999, ReadStatus::Ok)]
#[case(20, 21_000, ReadStatus::Timeout)]
#[case(1, 2_000, ReadStatus::Timeout)]
fn test_timeout_threshold(#[case] timeout_ms: u32, #[case] idle_micros: u32, #[case] status: ReadStatus) {
    let bench: PulseBench = PulseBench::new(u32::MAX - 10);
    let mut reader = bench.attach(RcPin::D13, ChannelConfig::new().with_timeout(timeout_ms));

    bench.rise(RcPin::D13);
    bench.advance_micros(idle_micros);
    assert_eq!(reader.status(), status);
}

#[test]
fn test_receiver_frame_on_three_groups() {
    println!("📻 Simulating a 50 Hz receiver frame...");
    let bench: PulseBench = PulseBench::new(0);
    let config = ChannelConfig::new()
        .with_timeout(100)
        .with_valid_range(900, 2100, true);
    let mut throttle = bench.attach(RcPin::D53, config);
    let mut aileron = bench.attach(RcPin::D15, config);
    let mut elevator = bench.attach(RcPin::A8, config);

    for frame in 0..5u32 {
        let widths = [1_000 + frame * 100, 1_500 - frame * 50, 1_900];
        bench.pulse(RcPin::D53, widths[0]);
        bench.pulse(RcPin::D15, widths[1]);
        bench.pulse(RcPin::A8, widths[2]);
        bench.advance_micros(20_000 - widths.iter().sum::<u32>());

        assert_eq!(throttle.read(), Ok(widths[0]));
        assert_eq!(aileron.read(), Ok(widths[1]));
        assert_eq!(elevator.read(), Ok(widths[2]));
    }

    // Receiver drops out
    bench.advance_millis(150);
    assert_eq!(throttle.status(), ReadStatus::Timeout);
    assert_eq!(aileron.status(), ReadStatus::Timeout);
    assert_eq!(elevator.micros(), 1_900);
    println!("  ✅ Frames decoded, dropout detected");
}

#[test]
fn test_failed_port_read_drops_event() {
    use rc_reader_core::hal::mock::{MockClock, MockPort};

    let readers: RcReaders<MockClock, 4> = RcReaders::new(MockClock::new(0));
    let mut reader = RcReader::new(&readers, RcPin::D10, ChannelConfig::default(), &mut NoOpPinChange);
    let mut port = MockPort::new();

    port.set_level(RcPin::D10, true);
    readers.on_group0(&mut port);
    readers.clock().advance(1_500);

    port.set_fail_reads(true);
    port.set_level(RcPin::D10, false);
    readers.on_group0(&mut port);
    assert_eq!(reader.read(), Ok(0));

    // Next successful snapshot sees the line low and closes the pulse
    readers.clock().advance(100);
    port.set_fail_reads(false);
    readers.on_group0(&mut port);
    assert_eq!(reader.read(), Ok(1_600));
}
