//! # Application Framework
//!
//! The screen belongs to exactly one of two modes at a time:
//!
//! ```text
//!            command handler launches an app
//!  ┌──────────┐ ───────────────────────────▶ ┌──────────┐
//!  │ Terminal │                              │  Visual  │
//!  └──────────┘ ◀─────────────────────────── └──────────┘
//!               app's on_key returns true
//!               (terminal is redrawn)
//! ```
//!
//! ## Event Flow
//!
//! 1. The main loop drains the key queue into [`ModeDispatcher::handle_key`]
//! 2. Terminal mode feeds the terminal; Visual mode feeds only the app
//! 3. [`ModeDispatcher::tick`] runs once per loop pass and advances the
//!    visual app (the terminal has nothing to animate)

use alloc::boxed::Box;

use crate::apps::terminal_app::TerminalApp;
use crate::devices::framebuffer::TextScreen;
use crate::devices::input::KeyCode;
use crate::kernel::Machine;
use crate::serial_println;

/// A full-screen, real-time application.
pub trait VisualApp {
    fn name(&self) -> &'static str;

    /// Resets state and draws the first frame. Called by whoever launches
    /// the app, before the mode switch.
    fn init(&mut self, screen: &mut dyn TextScreen, now_ms: u64);

    /// Returns true to hand the screen back to the terminal.
    fn on_key(&mut self, key: KeyCode, screen: &mut dyn TextScreen) -> bool;

    fn tick(&mut self, screen: &mut dyn TextScreen, now_ms: u64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Terminal,
    Visual,
}

enum ActiveMode {
    Terminal,
    Visual(Box<dyn VisualApp>),
}

/// Kernel context: owns the screen, the machine services, the terminal and
/// whichever visual app is running.
pub struct ModeDispatcher<S: TextScreen, M: Machine> {
    screen: S,
    machine: M,
    terminal: TerminalApp,
    active: ActiveMode,
}

impl<S: TextScreen, M: Machine> ModeDispatcher<S, M> {
    pub fn new(screen: S, machine: M, terminal: TerminalApp) -> Self {
        Self {
            screen,
            machine,
            terminal,
            active: ActiveMode::Terminal,
        }
    }

    /// Draws the terminal for the first time.
    pub fn start(&mut self) {
        self.terminal.redraw(&mut self.screen);
    }

    pub fn mode(&self) -> OperatingMode {
        match self.active {
            ActiveMode::Terminal => OperatingMode::Terminal,
            ActiveMode::Visual(_) => OperatingMode::Visual,
        }
    }

    /// Hands the screen to `app`, which must already be initialized.
    pub fn set_visual(&mut self, app: Box<dyn VisualApp>) {
        serial_println!("[mode] terminal -> visual ({})", app.name());
        self.active = ActiveMode::Visual(app);
    }

    /// Returns to the terminal and redraws it. No-op in Terminal mode.
    pub fn set_terminal(&mut self) {
        if let ActiveMode::Visual(app) = &self.active {
            serial_println!("[mode] visual ({}) -> terminal", app.name());
            self.active = ActiveMode::Terminal;
            self.terminal.redraw(&mut self.screen);
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        let mut launch = None;
        let exit = match &mut self.active {
            ActiveMode::Terminal => {
                launch = self.terminal.on_key(key, &mut self.screen, &mut self.machine);
                false
            }
            ActiveMode::Visual(app) => app.on_key(key, &mut self.screen),
        };

        if let Some(app) = launch {
            self.set_visual(app);
        } else if exit {
            self.set_terminal();
        }
    }

    pub fn tick(&mut self) {
        if let ActiveMode::Visual(app) = &mut self.active {
            let now = self.machine.uptime_ms();
            app.tick(&mut self.screen, now);
        }
    }

    /// Appends a line to the terminal history. The screen is only touched
    /// while the terminal owns it.
    pub fn announce(&mut self, text: &str) {
        match self.active {
            ActiveMode::Terminal => self.terminal.write_line(text, &mut self.screen),
            ActiveMode::Visual(_) => self.terminal.push_line(text),
        }
    }

    pub fn terminal(&self) -> &TerminalApp {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut TerminalApp {
        &mut self.terminal
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }
}
