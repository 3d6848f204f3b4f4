//! 8259 interrupt controller pair.
//!
//! Hardware lines 0..7 land on vectors 32..39 (primary) and lines 8..15 on
//! 40..47 (secondary, cascaded through primary line 2). After
//! initialization only the keyboard line is open; the timer opens its own
//! line once the PIT is programmed.

use pic8259::ChainedPics;
use spin::Mutex;

use crate::ports;

pub const PIC_1_OFFSET: u8 = 32;
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;
const CASCADE_LINE: u8 = 2;

/// Primary: everything masked except IRQ1.
pub const PRIMARY_MASK: u8 = 0xFD;
/// Secondary: everything masked.
pub const SECONDARY_MASK: u8 = 0xFF;

pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InterruptIndex {
    Timer = PIC_1_OFFSET,
    Keyboard,
}

impl InterruptIndex {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_usize(self) -> usize {
        self as usize
    }

    /// Hardware line number on the controller pair.
    pub const fn irq(self) -> u8 {
        self as u8 - PIC_1_OFFSET
    }
}

/// Which controllers must be told an interrupt has been serviced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EoiTarget {
    Primary,
    /// Secondary first, then primary.
    Both,
}

impl EoiTarget {
    /// `None` for vectors that did not come from the controllers.
    pub const fn for_vector(vector: u8) -> Option<Self> {
        if vector < PIC_1_OFFSET || vector >= PIC_1_OFFSET + 16 {
            None
        } else if vector >= PIC_2_OFFSET {
            Some(EoiTarget::Both)
        } else {
            Some(EoiTarget::Primary)
        }
    }
}

/// Remaps both controllers and applies the boot masks.
///
/// # Safety
/// Must run once, with interrupts disabled.
pub unsafe fn initialize() {
    let mut pics = PICS.lock();
    pics.initialize();
    pics.write_masks(PRIMARY_MASK, SECONDARY_MASK);
}

/// Opens one hardware line. Secondary lines also open the cascade.
pub fn unmask(irq: u8) {
    let mut pics = PICS.lock();
    unsafe {
        let [primary, secondary] = pics.read_masks();
        if irq < 8 {
            pics.write_masks(primary & !(1 << irq), secondary);
        } else {
            pics.write_masks(primary & !(1 << CASCADE_LINE), secondary & !(1 << (irq - 8)));
        }
    }
}

/// Acknowledges `vector`. Goes straight to the command ports so it is safe
/// to call from any handler regardless of who holds `PICS`.
pub fn end_of_interrupt(vector: u8) {
    match EoiTarget::for_vector(vector) {
        Some(EoiTarget::Both) => unsafe {
            ports::write(ports::PIC2_COMMAND, ports::PIC_EOI);
            ports::write(ports::PIC1_COMMAND, ports::PIC_EOI);
        },
        Some(EoiTarget::Primary) => unsafe {
            ports::write(ports::PIC1_COMMAND, ports::PIC_EOI);
        },
        None => {}
    }
}
