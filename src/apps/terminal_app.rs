//! # Terminal Application
//!
//! Owns the scrollback, the command line and the command registry.
//!
//! ## Keys
//!
//! - printable keys: append to the command line
//! - `Backspace`: delete one character (the prompt is protected)
//! - `Enter`: tokenize and dispatch the line, then reset it
//! - `Up` / `Down`: scroll the history one line older / newer

use alloc::boxed::Box;

use crate::app::VisualApp;
use crate::cmd_executor::{tokenize, CommandRegistry, Shell};
use crate::config::{COMMAND_ROW, MAX_TOKENS, VISIBLE_ROWS};
use crate::devices::framebuffer::{ColorCode, TextScreen};
use crate::devices::input::KeyCode;
use crate::kernel::Machine;
use crate::terminal::{CommandLine, Scrollback};

pub struct TerminalApp {
    scrollback: Scrollback,
    line: CommandLine,
    commands: CommandRegistry,
    color: ColorCode,
}

impl TerminalApp {
    pub fn new(commands: CommandRegistry) -> Self {
        Self {
            scrollback: Scrollback::new(),
            line: CommandLine::new(),
            commands,
            color: ColorCode::DEFAULT,
        }
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn command_line(&self) -> &CommandLine {
        &self.line
    }

    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn write_line(&mut self, text: &str, screen: &mut dyn TextScreen) {
        self.scrollback.write_line(text);
        self.scrollback.render(screen);
    }

    /// Records a line without drawing it.
    pub fn push_line(&mut self, text: &str) {
        self.scrollback.write_line(text);
    }

    pub fn scroll(&mut self, delta: isize, screen: &mut dyn TextScreen) {
        if self.scrollback.scroll(delta) {
            self.scrollback.render(screen);
        }
    }

    /// Full repaint: history, blank separator, command line.
    pub fn redraw(&self, screen: &mut dyn TextScreen) {
        self.scrollback.render(screen);
        screen.write_row(&[], self.color, VISIBLE_ROWS);
        self.line.render(screen, COMMAND_ROW, self.color);
    }

    /// Returns a visual app when the entered command launched one.
    pub fn on_key(
        &mut self,
        key: KeyCode,
        screen: &mut dyn TextScreen,
        machine: &mut dyn Machine,
    ) -> Option<Box<dyn VisualApp>> {
        match key {
            KeyCode::ENTER => {
                let launch = self.run_command(screen, machine);
                self.line.reset();
                if launch.is_none() {
                    self.line.render(screen, COMMAND_ROW, self.color);
                }
                return launch;
            }
            KeyCode::BACKSPACE => {
                if self.line.backspace() {
                    self.line.render(screen, COMMAND_ROW, self.color);
                }
            }
            KeyCode::ARROW_UP => self.scroll(1, screen),
            KeyCode::ARROW_DOWN => self.scroll(-1, screen),
            other => {
                if let Some(ch) = other.to_char() {
                    if self.line.insert(ch) {
                        self.line.render(screen, COMMAND_ROW, self.color);
                    }
                }
            }
        }
        None
    }

    fn run_command(
        &mut self,
        screen: &mut dyn TextScreen,
        machine: &mut dyn Machine,
    ) -> Option<Box<dyn VisualApp>> {
        let mut tokens = [""; MAX_TOKENS];
        let count = tokenize(self.line.input(), &mut tokens);
        if count == 0 {
            return None;
        }
        let mut shell = Shell::new(&mut self.scrollback, screen, machine, &self.commands);
        self.commands.dispatch(&mut shell, &tokens[..count]);
        shell.into_launch()
    }
}
