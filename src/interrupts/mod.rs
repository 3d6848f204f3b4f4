//! CPU exception and hardware interrupt plumbing.
pub mod gdt;
#[allow(clippy::module_inception)]
pub mod interrupts;
pub mod pic;
pub mod timer;

pub use interrupts::{dispatch, TrapAction};

/// Loads the GDT and IDT and remaps the controllers. Interrupts stay
/// disabled; the caller enables them once every handler's state is ready.
pub fn init() {
    gdt::init();
    interrupts::init_idt();
    unsafe { pic::initialize() };
}
