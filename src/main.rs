#![no_std]
#![no_main]

extern crate alloc;
extern crate rlibc;

use bootloader_api::{entry_point, BootInfo, BootloaderConfig};
use core::fmt::Write;
use core::panic::PanicInfo;

use cellkernel::app::ModeDispatcher;
use cellkernel::apps::terminal_app::TerminalApp;
use cellkernel::cmd_executor::CommandRegistry;
use cellkernel::devices::drivers::dequeue_key;
use cellkernel::devices::framebuffer::screen::emergency_write_line;
use cellkernel::kernel::power::halt_forever;
use cellkernel::kernel::status::{all_components_ready, for_each_component};
use cellkernel::kernel::{init_display, init_kernel, Hardware};
use cellkernel::serial::emergency_print;
use cellkernel::serial_println;

pub static BOOTLOADER_CONFIG: BootloaderConfig = {
    let mut config = BootloaderConfig::new_default();
    config.kernel_stack_size = 128 * 1024;
    config
};

entry_point!(kernel_main, config = &BOOTLOADER_CONFIG);

fn kernel_main(boot_info: &'static mut BootInfo) -> ! {
    if let Err(err) = init_kernel() {
        serial_println!("Kernel initialization failed: {}", err);
        halt_forever();
    }

    let screen = match init_display(boot_info) {
        Ok(screen) => screen,
        Err(err) => {
            serial_println!("Display initialization failed: {}", err);
            halt_forever();
        }
    };

    for_each_component(|component| {
        serial_println!("[init] {:<16} {}", component.name, component.status);
    });
    if !all_components_ready() {
        serial_println!("[init] some components are not ready");
    }

    let terminal = TerminalApp::new(CommandRegistry::with_builtins());
    let mut kernel = ModeDispatcher::new(screen, Hardware, terminal);
    kernel.start();
    kernel.announce("Welcome to cellkernel!");
    kernel.announce("Type 'help' for a list of commands.");

    loop {
        while let Some(key) = dequeue_key() {
            kernel.handle_key(key);
        }
        kernel.tick();
        x86_64::instructions::hlt();
    }
}

/// Fixed-size line buffer so the panic path never allocates.
struct PanicLine {
    buf: [u8; 80],
    len: usize,
}

impl Write for PanicLine {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for &byte in s.as_bytes() {
            if self.len == self.buf.len() {
                break;
            }
            self.buf[self.len] = byte;
            self.len += 1;
        }
        Ok(())
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    x86_64::instructions::interrupts::disable();
    emergency_print(format_args!("PANIC: {} | {:?}", info.message(), info.location()));

    let mut line = PanicLine { buf: [0; 80], len: 0 };
    let _ = write!(line, "!! PANIC !! {}", info.message());
    let text = core::str::from_utf8(&line.buf[..line.len]).unwrap_or("!! PANIC !!");
    emergency_write_line(text, 0);

    halt_forever()
}
