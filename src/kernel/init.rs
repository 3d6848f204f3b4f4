/// Kernel initialization phases
use bootloader_api::BootInfo;

use super::status::{register_component, update_component_status, InitStatus};
use super::InitError;
use crate::config::TIMER_HZ;
use crate::devices::framebuffer::{framebuffer::init_framebuffer, FramebufferScreen};
use crate::interrupts::{self, timer};
use crate::{memory, serial, serial_println};

const COMPONENTS: [&str; 4] = ["Heap", "Interrupt System", "Timer", "Display"];

/// Brings the machine up in dependency order and enables interrupts.
/// The display is initialized separately because it needs the boot info.
pub fn init_kernel() -> Result<(), InitError> {
    serial::init();
    for name in COMPONENTS {
        register_component(name);
    }
    serial_println!("[init] cellkernel starting");

    init_phase("Heap", || memory::init_heap().map_err(InitError::Heap))?;
    init_phase("Interrupt System", || {
        interrupts::init();
        Ok(())
    })?;
    init_phase("Timer", || {
        let hz = timer::init(TIMER_HZ);
        serial_println!("[timer] PIT running at {} Hz", hz);
        Ok(())
    })?;

    x86_64::instructions::interrupts::enable();
    Ok(())
}

pub fn init_display(boot_info: &'static mut BootInfo) -> Result<FramebufferScreen, InitError> {
    let framebuffer = boot_info.framebuffer.as_mut();
    init_phase("Display", move || {
        let fb = framebuffer.ok_or(InitError::NoFramebuffer)?;
        let info = fb.info();
        serial_println!(
            "[display] {}x{} {:?}, {} bytes/pixel",
            info.width,
            info.height,
            info.pixel_format,
            info.bytes_per_pixel
        );
        init_framebuffer(fb);
        FramebufferScreen::new().ok_or(InitError::NoFramebuffer)
    })
}

fn init_phase<T>(
    name: &'static str,
    init_fn: impl FnOnce() -> Result<T, InitError>,
) -> Result<T, InitError> {
    update_component_status(name, InitStatus::InProgress);
    serial_println!("[init] {}...", name);

    match init_fn() {
        Ok(value) => {
            update_component_status(name, InitStatus::Completed);
            serial_println!("[init] {} ready", name);
            Ok(value)
        }
        Err(err) => {
            update_component_status(name, InitStatus::Failed);
            serial_println!("[init] {} failed: {}", name, err);
            Err(err)
        }
    }
}
