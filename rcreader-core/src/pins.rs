//! ATmega2560 pin-change interrupt pin table
//!
//! ```text
//! PORT  BIT  BOARD PIN  PCINT  GROUP
//! B     0-7  53,52,51,50,10,11,12,13   0-7    0
//! E     0    0          8      1 (snapshot bit 7)
//! J     0-1  15,14      9-10   1 (snapshot bits 0-1)
//! K     0-7  A8..A15    16-23  2
//! ```
//!
//! PCINT11-15 (PJ2-PJ6) are not broken out on the board.

use crate::hal::{HalError, PortReader};
use crate::types::{ChannelPin, InterruptGroup, PinMapping};

/// Registry capacity matching the 18 wired pin-change lines
pub const MAX_CHANNELS: usize = 18;

/// Pin that cannot be measured with pin-change interrupts
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsupportedPin(pub u8);

#[cfg(feature = "std")]
impl core::fmt::Display for UnsupportedPin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "pin {} has no pin-change interrupt", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnsupportedPin {}

/// Usable input pins, numbered like the board silkscreen
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RcPin {
    // PORT B
    D53 = 53,
    D52 = 52,
    D51 = 51,
    D50 = 50,
    D10 = 10,
    D11 = 11,
    D12 = 12,
    D13 = 13,
    // PORT E
    D0 = 0,
    // PORT J
    D15 = 15,
    D14 = 14,
    // PORT K
    A8 = 62,
    A9 = 63,
    A10 = 64,
    A11 = 65,
    A12 = 66,
    A13 = 67,
    A14 = 68,
    A15 = 69,
}

impl RcPin {
    pub const ALL: [RcPin; 19] = [
        RcPin::D53,
        RcPin::D52,
        RcPin::D51,
        RcPin::D50,
        RcPin::D10,
        RcPin::D11,
        RcPin::D12,
        RcPin::D13,
        RcPin::D0,
        RcPin::D15,
        RcPin::D14,
        RcPin::A8,
        RcPin::A9,
        RcPin::A10,
        RcPin::A11,
        RcPin::A12,
        RcPin::A13,
        RcPin::A14,
        RcPin::A15,
    ];

    /// Board pin number
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// PCINTn line number, used for the PCMSKx register bit
    pub const fn pcint(self) -> u8 {
        match self {
            RcPin::D53 => 0,
            RcPin::D52 => 1,
            RcPin::D51 => 2,
            RcPin::D50 => 3,
            RcPin::D10 => 4,
            RcPin::D11 => 5,
            RcPin::D12 => 6,
            RcPin::D13 => 7,
            RcPin::D0 => 8,
            RcPin::D15 => 9,
            RcPin::D14 => 10,
            RcPin::A8 => 16,
            RcPin::A9 => 17,
            RcPin::A10 => 18,
            RcPin::A11 => 19,
            RcPin::A12 => 20,
            RcPin::A13 => 21,
            RcPin::A14 => 22,
            RcPin::A15 => 23,
        }
    }

    pub const fn group(self) -> InterruptGroup {
        match self.pcint() / 8 {
            0 => InterruptGroup::Group0,
            1 => InterruptGroup::Group1,
            _ => InterruptGroup::Group2,
        }
    }

    /// Bit inside the group snapshot. Equal to the port bit except for PE0,
    /// which is folded into bit 7 of the PORTJ snapshot.
    pub const fn snapshot_bit(self) -> u8 {
        match self {
            RcPin::D0 => 7,
            RcPin::D15 => 0,
            RcPin::D14 => 1,
            other => other.pcint() % 8,
        }
    }
}

impl ChannelPin for RcPin {
    fn mapping(self) -> PinMapping {
        PinMapping::new(self.number(), self.group(), self.snapshot_bit())
    }
}

impl TryFrom<u8> for RcPin {
    type Error = UnsupportedPin;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        RcPin::ALL
            .iter()
            .copied()
            .find(|pin| pin.number() == number)
            .ok_or(UnsupportedPin(number))
    }
}

/// Compose the group 1 snapshot from PINJ and the PE0 level
///
/// PJ0-PJ6 keep their bit positions; PE0 lives on another port and takes
/// bit 7, which PJ7 never uses for pin-change interrupts.
pub const fn group1_snapshot(pinj: u8, pe0_high: bool) -> u8 {
    (pinj & 0x7F) | ((pe0_high as u8) << 7)
}

/// ATmega2560 input registers sampled for the group snapshots
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRegister {
    PinB,
    PinE,
    PinJ,
    PinK,
}

/// Group snapshots built from the ATmega2560 PINx registers
///
/// `read` returns the current value of one register; a board supplies its
/// volatile register access, a simulation its stored levels.
pub struct Mega2560Port<F> {
    read: F,
}

impl<F> Mega2560Port<F>
where
    F: FnMut(PinRegister) -> u8,
{
    pub const fn new(read: F) -> Self {
        Self { read }
    }
}

impl<F> PortReader for Mega2560Port<F>
where
    F: FnMut(PinRegister) -> u8,
{
    fn read_group(&mut self, group: InterruptGroup) -> Result<u8, HalError> {
        Ok(match group {
            InterruptGroup::Group0 => (self.read)(PinRegister::PinB),
            InterruptGroup::Group1 => {
                let pinj = (self.read)(PinRegister::PinJ);
                let pine = (self.read)(PinRegister::PinE);
                group1_snapshot(pinj, pine & 0x01 != 0)
            }
            InterruptGroup::Group2 => (self.read)(PinRegister::PinK),
        })
    }
}
