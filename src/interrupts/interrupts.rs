//! Interrupt descriptor table and the common trap path.
//!
//! | vectors | source          | action                              |
//! |---------|-----------------|-------------------------------------|
//! | 0..31   | CPU exceptions  | diagnostic, then halt (1, 3, 4 log) |
//! | 32      | PIT, IRQ0       | advance the tick counter            |
//! | 33      | keyboard, IRQ1  | decode scancode into the key queue  |
//! | 34..47  | other IRQ lines | acknowledged and ignored            |
//!
//! Every handler funnels into [`dispatch`], which classifies the vector
//! with [`TrapAction::for_vector`] and acknowledges controller vectors
//! after the work is done. Reserved vectors (9, 15, 22..=27, 31) stay
//! absent from the table.

use spin::Lazy;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};

use crate::devices::drivers::ps2_keyboard;
use crate::devices::framebuffer::screen;
use crate::interrupts::gdt;
use crate::interrupts::pic::{self, InterruptIndex};
use crate::interrupts::timer;
use crate::kernel::power::halt_forever;
use crate::{ports, serial_println};

const EXCEPTION_NAMES: [&str; 32] = [
    "DIVIDE BY ZERO",
    "DEBUG",
    "NON-MASKABLE INTERRUPT",
    "BREAKPOINT",
    "OVERFLOW",
    "BOUND RANGE EXCEEDED",
    "INVALID OPCODE",
    "DEVICE NOT AVAILABLE",
    "DOUBLE FAULT",
    "COPROCESSOR SEGMENT OVERRUN",
    "INVALID TSS",
    "SEGMENT NOT PRESENT",
    "STACK-SEGMENT FAULT",
    "GENERAL PROTECTION FAULT",
    "PAGE FAULT",
    "RESERVED",
    "x87 FLOATING-POINT EXCEPTION",
    "ALIGNMENT CHECK",
    "MACHINE CHECK",
    "SIMD FLOATING-POINT EXCEPTION",
    "VIRTUALIZATION EXCEPTION",
    "CONTROL PROTECTION EXCEPTION",
    "RESERVED",
    "RESERVED",
    "RESERVED",
    "RESERVED",
    "RESERVED",
    "RESERVED",
    "HYPERVISOR INJECTION EXCEPTION",
    "VMM COMMUNICATION EXCEPTION",
    "SECURITY EXCEPTION",
    "RESERVED",
];

/// What the kernel does when a vector fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapAction {
    /// Print the diagnostic and halt the machine.
    Fatal(&'static str),
    /// Log and return to the interrupted code.
    Resume(&'static str),
    Tick,
    Keyboard,
    Ignore,
}

impl TrapAction {
    pub fn for_vector(vector: u8) -> Self {
        match vector {
            1 | 3 | 4 => TrapAction::Resume(EXCEPTION_NAMES[vector as usize]),
            0..=31 => TrapAction::Fatal(EXCEPTION_NAMES[vector as usize]),
            v if v == InterruptIndex::Timer.as_u8() => TrapAction::Tick,
            v if v == InterruptIndex::Keyboard.as_u8() => TrapAction::Keyboard,
            _ => TrapAction::Ignore,
        }
    }
}

macro_rules! trap_handler {
    ($name:ident, $vector:expr) => {
        extern "x86-interrupt" fn $name(frame: InterruptStackFrame) {
            dispatch($vector, &frame, None);
        }
    };
    ($name:ident, $vector:expr, error_code) => {
        extern "x86-interrupt" fn $name(frame: InterruptStackFrame, error_code: u64) {
            dispatch($vector, &frame, Some(error_code));
        }
    };
}

trap_handler!(divide_error_handler, 0);
trap_handler!(debug_handler, 1);
trap_handler!(nmi_handler, 2);
trap_handler!(breakpoint_handler, 3);
trap_handler!(overflow_handler, 4);
trap_handler!(bound_range_handler, 5);
trap_handler!(invalid_opcode_handler, 6);
trap_handler!(device_not_available_handler, 7);
trap_handler!(invalid_tss_handler, 10, error_code);
trap_handler!(segment_not_present_handler, 11, error_code);
trap_handler!(stack_segment_handler, 12, error_code);
trap_handler!(general_protection_handler, 13, error_code);
trap_handler!(x87_floating_point_handler, 16);
trap_handler!(alignment_check_handler, 17, error_code);
trap_handler!(simd_floating_point_handler, 19);
trap_handler!(virtualization_handler, 20);
trap_handler!(control_protection_handler, 21, error_code);
trap_handler!(hv_injection_handler, 28);
trap_handler!(vmm_communication_handler, 29, error_code);
trap_handler!(security_handler, 30, error_code);
trap_handler!(timer_handler, InterruptIndex::Timer.as_u8());
trap_handler!(keyboard_handler, InterruptIndex::Keyboard.as_u8());

extern "x86-interrupt" fn double_fault_handler(frame: InterruptStackFrame, error_code: u64) -> ! {
    dispatch(8, &frame, Some(error_code));
    halt_forever()
}

extern "x86-interrupt" fn machine_check_handler(frame: InterruptStackFrame) -> ! {
    dispatch(18, &frame, None);
    halt_forever()
}

extern "x86-interrupt" fn page_fault_handler(
    frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    crate::serial::emergency_print(format_args!(
        "[idt] page fault at {:?} ({:?})",
        Cr2::read(),
        error_code
    ));
    dispatch(14, &frame, Some(error_code.bits()));
}

static IDT: Lazy<InterruptDescriptorTable> = Lazy::new(|| {
    let mut idt = InterruptDescriptorTable::new();

    idt.divide_error.set_handler_fn(divide_error_handler);
    idt.debug.set_handler_fn(debug_handler);
    idt.non_maskable_interrupt.set_handler_fn(nmi_handler);
    idt.breakpoint.set_handler_fn(breakpoint_handler);
    idt.overflow.set_handler_fn(overflow_handler);
    idt.bound_range_exceeded.set_handler_fn(bound_range_handler);
    idt.invalid_opcode.set_handler_fn(invalid_opcode_handler);
    idt.device_not_available.set_handler_fn(device_not_available_handler);
    unsafe {
        idt.double_fault
            .set_handler_fn(double_fault_handler)
            .set_stack_index(gdt::DOUBLE_FAULT_IST_INDEX);
    }
    idt.invalid_tss.set_handler_fn(invalid_tss_handler);
    idt.segment_not_present.set_handler_fn(segment_not_present_handler);
    idt.stack_segment_fault.set_handler_fn(stack_segment_handler);
    idt.general_protection_fault.set_handler_fn(general_protection_handler);
    idt.page_fault.set_handler_fn(page_fault_handler);
    idt.x87_floating_point.set_handler_fn(x87_floating_point_handler);
    idt.alignment_check.set_handler_fn(alignment_check_handler);
    idt.machine_check.set_handler_fn(machine_check_handler);
    idt.simd_floating_point.set_handler_fn(simd_floating_point_handler);
    idt.virtualization.set_handler_fn(virtualization_handler);
    idt.cp_protection_exception.set_handler_fn(control_protection_handler);
    idt.hv_injection_exception.set_handler_fn(hv_injection_handler);
    idt.vmm_communication_exception.set_handler_fn(vmm_communication_handler);
    idt.security_exception.set_handler_fn(security_handler);

    idt[InterruptIndex::Timer.as_u8()].set_handler_fn(timer_handler);
    idt[InterruptIndex::Keyboard.as_u8()].set_handler_fn(keyboard_handler);

    idt
});

pub fn init_idt() {
    IDT.load();
    let pointer = x86_64::instructions::tables::sidt();
    // Packed struct: copy the fields out before formatting.
    let (base, limit) = (pointer.base, pointer.limit);
    serial_println!("[idt] loaded at {:?}, limit {:#x}", base, limit);
}

/// Common entry for every installed vector.
pub fn dispatch(vector: u8, frame: &InterruptStackFrame, error_code: Option<u64>) {
    match TrapAction::for_vector(vector) {
        TrapAction::Fatal(name) => fatal(vector, name, frame, error_code),
        TrapAction::Resume(name) => {
            crate::serial::emergency_print(format_args!(
                "[idt] {} at {:?}",
                name, frame.instruction_pointer
            ));
        }
        TrapAction::Tick => timer::on_tick(),
        TrapAction::Keyboard => {
            let scancode: u8 = unsafe { ports::read(ports::KEYBOARD_DATA) };
            ps2_keyboard::on_scancode(scancode);
        }
        TrapAction::Ignore => {}
    }
    pic::end_of_interrupt(vector);
}

fn fatal(vector: u8, name: &str, frame: &InterruptStackFrame, error_code: Option<u64>) -> ! {
    let mut message = [0u8; 64];
    let text = fatal_message(name, &mut message);

    crate::serial::emergency_print(format_args!(
        "{} (vector {}, error code {:?})\n{:#?}",
        text, vector, error_code, frame
    ));
    screen::emergency_write_line(text, 0);
    halt_forever()
}

/// Builds `!! NAME !! System Halted.` without allocating; the heap may be
/// what faulted.
fn fatal_message<'b>(name: &str, buf: &'b mut [u8; 64]) -> &'b str {
    let mut len = 0;
    for part in ["!! ", name, " !! System Halted."] {
        for &byte in part.as_bytes() {
            if len < buf.len() {
                buf[len] = byte;
                len += 1;
            }
        }
    }
    core::str::from_utf8(&buf[..len]).unwrap_or("!! FAULT !! System Halted.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_exceptions_halt() {
        assert_eq!(TrapAction::for_vector(0), TrapAction::Fatal("DIVIDE BY ZERO"));
        assert_eq!(TrapAction::for_vector(8), TrapAction::Fatal("DOUBLE FAULT"));
        assert_eq!(TrapAction::for_vector(13), TrapAction::Fatal("GENERAL PROTECTION FAULT"));
        assert_eq!(TrapAction::for_vector(14), TrapAction::Fatal("PAGE FAULT"));
        assert!(matches!(TrapAction::for_vector(6), TrapAction::Fatal(_)));
        assert!(matches!(TrapAction::for_vector(31), TrapAction::Fatal(_)));
    }

    #[test]
    fn test_debug_traps_resume() {
        for vector in [1, 3, 4] {
            assert!(matches!(TrapAction::for_vector(vector), TrapAction::Resume(_)));
        }
    }

    #[test]
    fn test_hardware_vectors() {
        assert_eq!(TrapAction::for_vector(32), TrapAction::Tick);
        assert_eq!(TrapAction::for_vector(33), TrapAction::Keyboard);
        assert_eq!(TrapAction::for_vector(34), TrapAction::Ignore);
        assert_eq!(TrapAction::for_vector(47), TrapAction::Ignore);
        assert_eq!(TrapAction::for_vector(200), TrapAction::Ignore);
    }

    #[test]
    fn test_fatal_message_format() {
        let mut buf = [0u8; 64];
        assert_eq!(
            fatal_message("DIVIDE BY ZERO", &mut buf),
            "!! DIVIDE BY ZERO !! System Halted."
        );
    }

    #[test]
    fn test_fatal_message_truncates() {
        let mut buf = [0u8; 64];
        let long = "X".repeat(100);
        assert_eq!(fatal_message(&long, &mut buf).len(), 64);
    }
}
