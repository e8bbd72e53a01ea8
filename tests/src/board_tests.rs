//! CH32V203 pin table driven through the shared reader

use rc_reader_core::hal::mock::{MockClock, MockPinChange};
use rc_reader_firmware::{group_snapshot, Ch32Pin, BOARD_CHANNELS, BOARD_CONFIG};
use rc_reader_core::*;

/// GPIOA/GPIOB input data registers as plain words
#[derive(Default)]
struct FakeIndr {
    porta: u32,
    portb: u32,
}

impl FakeIndr {
    fn set(&mut self, pin: Ch32Pin, high: bool) {
        let port = if pin.on_port_b() { &mut self.portb } else { &mut self.porta };
        if high {
            *port |= 1 << pin.line();
        } else {
            *port &= !(1 << pin.line());
        }
    }
}

impl PortReader for FakeIndr {
    fn read_group(&mut self, group: InterruptGroup) -> Result<u8, HalError> {
        Ok(group_snapshot(group, self.porta, self.portb))
    }
}

fn edge(
    readers: &RcReaders<MockClock, BOARD_CHANNELS>,
    indr: &mut FakeIndr,
    pin: Ch32Pin,
    high: bool,
) {
    indr.set(pin, high);
    readers.on_group_interrupt(pin.group(), indr);
}

#[test]
fn test_every_board_pin_measures() {
    let readers: RcReaders<MockClock, BOARD_CHANNELS> = RcReaders::new(MockClock::new(0));
    let mut control = MockPinChange::new();
    let mut indr = FakeIndr::default();

    let mut channels: Vec<_> = Ch32Pin::ALL
        .iter()
        .map(|&pin| (pin, RcReader::new(&readers, pin, BOARD_CONFIG, &mut control)))
        .collect();
    assert!(readers.registry().is_full());
    assert_eq!(control.enabled().len(), BOARD_CHANNELS);

    for (offset, (pin, reader)) in channels.iter_mut().enumerate() {
        let width = 1_000 + offset as u32 * 50;
        edge(&readers, &mut indr, *pin, true);
        readers.clock().advance(width);
        edge(&readers, &mut indr, *pin, false);
        assert_eq!(reader.read(), Ok(width), "{:?}", pin);
    }
}

#[test]
fn test_board_config_holds_through_glitch() {
    let readers: RcReaders<MockClock, BOARD_CHANNELS> = RcReaders::new(MockClock::new(0));
    let mut indr = FakeIndr::default();
    let mut reader = RcReader::new(&readers, Ch32Pin::PB13, BOARD_CONFIG, &mut NoOpPinChange);

    edge(&readers, &mut indr, Ch32Pin::PB13, true);
    readers.clock().advance(1_520);
    edge(&readers, &mut indr, Ch32Pin::PB13, false);
    assert_eq!(reader.micros(), 1_520);

    readers.clock().advance(18_000);
    edge(&readers, &mut indr, Ch32Pin::PB13, true);
    readers.clock().advance(40);
    edge(&readers, &mut indr, Ch32Pin::PB13, false);
    assert_eq!(reader.read(), Err(ReadError::InvalidValue(1_520)));
    assert_eq!(reader.micros(), 1_520);

    readers.clock().advance(120_000);
    assert_eq!(reader.status(), ReadStatus::Timeout);
}
