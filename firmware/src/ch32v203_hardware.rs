//! CH32V203 Hardware Implementation
//!
//! Three EXTI vectors act as the interrupt groups:
//!
//! ```text
//! GROUP  VECTOR(S)         LINES          SNAPSHOT
//! 0      EXTI0..EXTI4      PA0..PA4       GPIOA.INDR[4:0]
//! 1      EXTI9_5           PA5..PA9       GPIOA.INDR[9:5]
//! 2      EXTI15_10         PB10..PB15     GPIOB.INDR[15:10]
//! ```

use rc_reader_core::{
    ChannelConfig, ChannelPin, EmbassyClock, HalError, InterruptGroup, PinChangeControl,
    PinMapping, PortReader, RcReader, RcReaders,
};

/// CH32V203 Memory Map and Register Base Addresses
const RCC_BASE: u32 = 0x4002_1000;
const AFIO_BASE: u32 = 0x4001_0000;
const EXTI_BASE: u32 = 0x4001_0400;
const GPIOA_BASE: u32 = 0x4001_0800;
const GPIOB_BASE: u32 = 0x4001_0C00;
const PFIC_BASE: u32 = 0xE000_E000;

/// RCC Register offsets
const RCC_APB2PCENR: u32 = 0x18;

/// GPIO Register offsets
const GPIO_CFGLR: u32 = 0x00;
const GPIO_CFGHR: u32 = 0x04;
const GPIO_INDR: u32 = 0x08;
const GPIO_OUTDR: u32 = 0x0C;

/// AFIO Register offsets
const AFIO_EXTICR1: u32 = 0x08;

/// EXTI Register offsets
const EXTI_INTENR: u32 = 0x00;
const EXTI_RTENR: u32 = 0x08;
const EXTI_FTENR: u32 = 0x0C;
const EXTI_INTFR: u32 = 0x14;

/// PFIC interrupt enable registers (IRQ 0-31, 32-63)
const PFIC_IENR1: u32 = 0x100;

/// EXTI lines served by each group vector
const GROUP0_LINES: u32 = 0x0000_001F;
const GROUP1_LINES: u32 = 0x0000_03E0;
const GROUP2_LINES: u32 = 0x0000_FC00;

/// Input lines wired to pin-change interrupts
pub const BOARD_CHANNELS: usize = 16;

/// Channel table shared with the EXTI handlers
pub static READERS: RcReaders<EmbassyClock, BOARD_CHANNELS> = RcReaders::new(EmbassyClock);

/// Channel handle type for this board
pub type BoardReader = RcReader<'static, EmbassyClock, BOARD_CHANNELS>;

#[inline]
unsafe fn read_reg(addr: u32) -> u32 {
    core::ptr::read_volatile(addr as *const u32)
}

#[inline]
unsafe fn write_reg(addr: u32, value: u32) {
    core::ptr::write_volatile(addr as *mut u32, value);
}

#[inline]
unsafe fn modify_reg(addr: u32, f: impl FnOnce(u32) -> u32) {
    write_reg(addr, f(read_reg(addr)));
}

/// Inputs usable for pulse measurement
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ch32Pin {
    PA0,
    PA1,
    PA2,
    PA3,
    PA4,
    PA5,
    PA6,
    PA7,
    PA8,
    PA9,
    PB10,
    PB11,
    PB12,
    PB13,
    PB14,
    PB15,
}

impl Ch32Pin {
    pub const ALL: [Ch32Pin; BOARD_CHANNELS] = [
        Ch32Pin::PA0,
        Ch32Pin::PA1,
        Ch32Pin::PA2,
        Ch32Pin::PA3,
        Ch32Pin::PA4,
        Ch32Pin::PA5,
        Ch32Pin::PA6,
        Ch32Pin::PA7,
        Ch32Pin::PA8,
        Ch32Pin::PA9,
        Ch32Pin::PB10,
        Ch32Pin::PB11,
        Ch32Pin::PB12,
        Ch32Pin::PB13,
        Ch32Pin::PB14,
        Ch32Pin::PB15,
    ];

    /// Port bit, which is also the EXTI line number
    pub const fn line(self) -> u8 {
        match self {
            Ch32Pin::PA0 => 0,
            Ch32Pin::PA1 => 1,
            Ch32Pin::PA2 => 2,
            Ch32Pin::PA3 => 3,
            Ch32Pin::PA4 => 4,
            Ch32Pin::PA5 => 5,
            Ch32Pin::PA6 => 6,
            Ch32Pin::PA7 => 7,
            Ch32Pin::PA8 => 8,
            Ch32Pin::PA9 => 9,
            Ch32Pin::PB10 => 10,
            Ch32Pin::PB11 => 11,
            Ch32Pin::PB12 => 12,
            Ch32Pin::PB13 => 13,
            Ch32Pin::PB14 => 14,
            Ch32Pin::PB15 => 15,
        }
    }

    /// True for GPIOB pins
    pub const fn on_port_b(self) -> bool {
        self.line() >= 10
    }

    /// Unique id: port A lines keep their number, port B adds 16
    pub const fn id(self) -> u8 {
        if self.on_port_b() {
            16 + self.line()
        } else {
            self.line()
        }
    }

    pub const fn group(self) -> InterruptGroup {
        match self.line() {
            0..=4 => InterruptGroup::Group0,
            5..=9 => InterruptGroup::Group1,
            _ => InterruptGroup::Group2,
        }
    }

    /// Bit inside the group snapshot
    pub const fn snapshot_bit(self) -> u8 {
        match self.group() {
            InterruptGroup::Group0 => self.line(),
            InterruptGroup::Group1 => self.line() - 5,
            InterruptGroup::Group2 => self.line() - 10,
        }
    }

    /// Look up a pin by id; `None` for lines without a channel
    pub fn from_id(id: u8) -> Option<Self> {
        Ch32Pin::ALL.iter().copied().find(|pin| pin.id() == id)
    }

    /// PFIC interrupt number of the pin's EXTI vector
    pub const fn irq(self) -> u8 {
        match self.line() {
            0..=4 => 22 + self.line(),
            5..=9 => 39,
            _ => 56,
        }
    }
}

impl ChannelPin for Ch32Pin {
    fn mapping(self) -> PinMapping {
        PinMapping::new(self.id(), self.group(), self.snapshot_bit())
    }
}

/// Extract one group's snapshot from the two input data registers
pub const fn group_snapshot(group: InterruptGroup, porta_indr: u32, portb_indr: u32) -> u8 {
    match group {
        InterruptGroup::Group0 => (porta_indr & GROUP0_LINES) as u8,
        InterruptGroup::Group1 => ((porta_indr & GROUP1_LINES) >> 5) as u8,
        InterruptGroup::Group2 => ((portb_indr & GROUP2_LINES) >> 10) as u8,
    }
}

/// EXTI pending bits cleared by a group vector
pub const fn group_lines(group: InterruptGroup) -> u32 {
    match group {
        InterruptGroup::Group0 => GROUP0_LINES,
        InterruptGroup::Group1 => GROUP1_LINES,
        InterruptGroup::Group2 => GROUP2_LINES,
    }
}

/// Bulk reads of GPIOA/GPIOB input data registers
pub struct Ch32Port;

impl PortReader for Ch32Port {
    fn read_group(&mut self, group: InterruptGroup) -> Result<u8, HalError> {
        let indr = match group {
            InterruptGroup::Group2 => unsafe { read_reg(GPIOB_BASE + GPIO_INDR) },
            _ => unsafe { read_reg(GPIOA_BASE + GPIO_INDR) },
        };
        Ok(match group {
            InterruptGroup::Group2 => group_snapshot(group, 0, indr),
            _ => group_snapshot(group, indr, 0),
        })
    }
}

/// EXTI both-edge configuration for measurement inputs
pub struct Ch32PinChange;

impl PinChangeControl for Ch32PinChange {
    fn enable_pin_change(&mut self, pin: PinMapping) -> Result<(), HalError> {
        let pin = Ch32Pin::from_id(pin.id).ok_or(HalError::UnsupportedPin)?;
        let line = u32::from(pin.line());
        let port_base = if pin.on_port_b() { GPIOB_BASE } else { GPIOA_BASE };

        critical_section::with(|_| unsafe {
            // CNF=10 (input with pull-up/down), MODE=00
            let (cfg_reg, shift) = if line < 8 {
                (port_base + GPIO_CFGLR, line * 4)
            } else {
                (port_base + GPIO_CFGHR, (line - 8) * 4)
            };
            modify_reg(cfg_reg, |cfg| (cfg & !(0xF << shift)) | (0x8 << shift));
            // OUTDR bit high selects the pull-up
            modify_reg(port_base + GPIO_OUTDR, |odr| odr | (1 << line));

            // Route the EXTI line to the pin's port (A=0, B=1)
            let exticr = AFIO_BASE + AFIO_EXTICR1 + (line / 4) * 4;
            let field = (line % 4) * 4;
            let port_code = u32::from(pin.on_port_b());
            modify_reg(exticr, |v| (v & !(0xF << field)) | (port_code << field));

            // Both edges, interrupt unmasked
            modify_reg(EXTI_BASE + EXTI_RTENR, |v| v | (1 << line));
            modify_reg(EXTI_BASE + EXTI_FTENR, |v| v | (1 << line));
            modify_reg(EXTI_BASE + EXTI_INTENR, |v| v | (1 << line));

            let irq = u32::from(pin.irq());
            write_reg(PFIC_BASE + PFIC_IENR1 + (irq / 32) * 4, 1 << (irq % 32));
        });

        #[cfg(feature = "defmt")]
        defmt::debug!("EXTI{} armed for {:?}", line, pin);
        Ok(())
    }
}

/// Enable GPIOA, GPIOB and AFIO clocks
pub fn init_clocks() {
    unsafe {
        // Bit 0 = AFIO, Bit 2 = GPIOA, Bit 3 = GPIOB
        modify_reg(RCC_BASE + RCC_APB2PCENR, |v| v | (1 << 0) | (1 << 2) | (1 << 3));
    }
    #[cfg(feature = "defmt")]
    defmt::info!("CH32V203 clocks enabled");
}

/// Attach a channel on this board
pub fn attach(pin: Ch32Pin, config: ChannelConfig) -> BoardReader {
    RcReader::new(&READERS, pin, config, &mut Ch32PinChange)
}

fn on_group(group: InterruptGroup) {
    // Clear first so an edge during processing raises the vector again
    unsafe { write_reg(EXTI_BASE + EXTI_INTFR, group_lines(group)) };
    READERS.on_group_interrupt(group, &mut Ch32Port);
}

// Interrupt handlers (called from the EXTI vectors)

/// EXTI0..EXTI4 vectors
pub fn on_exti4_0() {
    on_group(InterruptGroup::Group0);
}

/// EXTI9_5 vector
pub fn on_exti9_5() {
    on_group(InterruptGroup::Group1);
}

/// EXTI15_10 vector
pub fn on_exti15_10() {
    on_group(InterruptGroup::Group2);
}
