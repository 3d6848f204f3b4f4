//! # Command Executor
//!
//! Named command registry for the terminal.
//!
//! ## Built-in Commands
//!
//! ### General
//! - `help [name]`: List commands, or show one command's help
//! - `echo <text>`: Echo text back
//! - `clear`: Clear the scrollback
//! - `sysinfo`: Banner, uptime and heap usage
//! - `uptime`: Time since boot
//!
//! ### Machine
//! - `beep [hz] [ms]`: Sound the PC speaker
//! - `sleep <ms>`: Block on the timer
//! - `shutdown`: Power off through QEMU's debug-exit port
//!
//! ### Visual
//! - `snake`: Switch to the snake game
//!
//! ### Testing
//! - `selftest`: Exercise heap, key queue and decoder on live hardware
//!
//! ## Dispatch
//!
//! The command line is split on spaces into at most `MAX_TOKENS` tokens.
//! Token 0 is looked up by exact name, first registration wins, and the
//! handler receives every token (its own name included). Handlers write
//! output through the [`Shell`] and may hand back a visual app to launch.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use crate::app::VisualApp;
use crate::apps::snake::SnakeGame;
use crate::config::{
    DEFAULT_BEEP_HZ, DEFAULT_BEEP_MS, MAX_COMMANDS, MAX_TOKENS, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::devices::framebuffer::TextScreen;
use crate::kernel::Machine;
use crate::terminal::Scrollback;
use crate::{serial_println, test_env};

pub type CommandFn = fn(&mut Shell<'_>, &[&str]);

#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub help: Option<&'static str>,
    pub handler: CommandFn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    Full,
    EmptyName,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Full => write!(f, "command table full ({} entries)", MAX_COMMANDS),
            RegistryError::EmptyName => write!(f, "command name is empty"),
        }
    }
}

/// Splits `input` on spaces, dropping empty tokens. Returns how many of
/// `out` were filled; extra tokens past `MAX_TOKENS` are ignored.
pub fn tokenize<'a>(input: &'a str, out: &mut [&'a str; MAX_TOKENS]) -> usize {
    let mut count = 0;
    for token in input.split(' ').filter(|t| !t.is_empty()).take(MAX_TOKENS) {
        out[count] = token;
        count += 1;
    }
    count
}

pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub const fn new() -> Self {
        Self { commands: Vec::new() }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.commands.extend_from_slice(&BUILTINS);
        registry
    }

    pub fn register(
        &mut self,
        name: &'static str,
        help: Option<&'static str>,
        handler: CommandFn,
    ) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.commands.len() >= MAX_COMMANDS {
            return Err(RegistryError::Full);
        }
        self.commands.push(Command { name, help, handler });
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Runs the command named by `tokens[0]`. Returns false if no command
    /// matched, after telling the user so.
    pub fn dispatch(&self, shell: &mut Shell<'_>, tokens: &[&str]) -> bool {
        let Some(&name) = tokens.first() else {
            return false;
        };
        match self.find(name) {
            Some(command) => {
                serial_println!("[cmd] {}", name);
                (command.handler)(shell, tokens);
                true
            }
            None => {
                shell.write_line("Command not recognized:");
                shell.write_line(name);
                false
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// What a running command can reach.
pub struct Shell<'a> {
    scrollback: &'a mut Scrollback,
    screen: &'a mut dyn TextScreen,
    machine: &'a mut dyn Machine,
    commands: &'a CommandRegistry,
    launch: Option<Box<dyn VisualApp>>,
}

impl<'a> Shell<'a> {
    pub fn new(
        scrollback: &'a mut Scrollback,
        screen: &'a mut dyn TextScreen,
        machine: &'a mut dyn Machine,
        commands: &'a CommandRegistry,
    ) -> Self {
        Self {
            scrollback,
            screen,
            machine,
            commands,
            launch: None,
        }
    }

    /// Appends output and redraws the history area.
    pub fn write_line(&mut self, text: &str) {
        self.scrollback.write_line(text);
        self.scrollback.render(self.screen);
    }

    pub fn clear(&mut self) {
        self.scrollback.clear();
        self.scrollback.render(self.screen);
    }

    pub fn screen(&mut self) -> &mut dyn TextScreen {
        self.screen
    }

    pub fn machine(&mut self) -> &mut dyn Machine {
        self.machine
    }

    pub fn commands(&self) -> &'a CommandRegistry {
        self.commands
    }

    /// Asks the terminal to switch to `app` once the command returns. The
    /// app must already have drawn its first frame.
    pub fn launch(&mut self, app: Box<dyn VisualApp>) {
        self.launch = Some(app);
    }

    pub fn into_launch(self) -> Option<Box<dyn VisualApp>> {
        self.launch
    }
}

const HELP_HELP: &str = "Display all commands available.\n\
                         help <commandName> displays the help information for that command.";

const fn builtin(name: &'static str, help: &'static str, handler: CommandFn) -> Command {
    Command {
        name,
        help: Some(help),
        handler,
    }
}

static BUILTINS: [Command; 10] = [
    builtin("help", HELP_HELP, help),
    builtin("shutdown", "Power off the machine (QEMU only).", shutdown),
    builtin("clear", "Clear the terminal history.", clear),
    builtin("echo", "echo <text> prints the text back.", echo),
    builtin("sysinfo", "Show uptime, heap usage and screen size.", sysinfo),
    builtin("uptime", "Time since the timer started.", uptime),
    builtin(
        "beep",
        "beep [hz] [ms] sounds the PC speaker (default 1000 Hz, 200 ms).",
        beep,
    ),
    builtin("sleep", "sleep <ms> waits on the timer.", sleep),
    builtin("snake", "Play snake. WASD to steer, ESC to quit.", snake),
    builtin("selftest", "Run the built-in heap, key queue and decoder checks.", selftest),
];

const NO_HELP: &str = "No help available.";

fn help(shell: &mut Shell<'_>, args: &[&str]) {
    let commands = shell.commands();
    if let Some(&name) = args.get(1) {
        match commands.find(name) {
            Some(command) => {
                shell.write_line(command.name);
                shell.write_line(command.help.unwrap_or(NO_HELP));
            }
            None => shell.write_line(NO_HELP),
        }
        return;
    }

    shell.write_line("Help------------------");
    for command in commands.iter() {
        shell.write_line(command.name);
        shell.write_line(command.help.unwrap_or(NO_HELP));
    }
    shell.write_line("----------------------");
}

fn shutdown(shell: &mut Shell<'_>, _args: &[&str]) {
    shell.write_line("Attempting QEMU Shutdown...");
    shell.machine().shutdown();
}

fn clear(shell: &mut Shell<'_>, _args: &[&str]) {
    shell.clear();
}

fn echo(shell: &mut Shell<'_>, args: &[&str]) {
    let text = args.get(1..).unwrap_or(&[]).join(" ");
    shell.write_line(&text);
}

const BANNER: &str = "+--------------------------------+\n\
                      |   c e l l k e r n e l          |\n\
                      +--------------------------------+";

fn format_uptime(ms: u64) -> alloc::string::String {
    format!("Uptime: {}.{:03} s", ms / 1000, ms % 1000)
}

fn sysinfo(shell: &mut Shell<'_>, _args: &[&str]) {
    shell.write_line(BANNER);
    let now = shell.machine().uptime_ms();
    shell.write_line(&format_uptime(now));
    let heap: alloc::string::String = match shell.machine().heap_stats() {
        Some(stats) => format!("Heap: {}", stats),
        None => "Heap: not initialized".into(),
    };
    shell.write_line(&heap);
    shell.write_line(&format!("Screen: {}x{} cells", SCREEN_WIDTH, SCREEN_HEIGHT));
}

fn uptime(shell: &mut Shell<'_>, _args: &[&str]) {
    let now = shell.machine().uptime_ms();
    shell.write_line(&format_uptime(now));
}

fn beep(shell: &mut Shell<'_>, args: &[&str]) {
    let frequency = args.get(1).map_or(Ok(DEFAULT_BEEP_HZ), |s| s.parse::<u32>());
    let duration = args.get(2).map_or(Ok(DEFAULT_BEEP_MS), |s| s.parse::<u64>());
    match (frequency, duration) {
        (Ok(hz), Ok(ms)) if hz > 0 => shell.machine().beep(hz, ms),
        _ => shell.write_line("Usage: beep [hz] [ms]"),
    }
}

fn sleep(shell: &mut Shell<'_>, args: &[&str]) {
    match args.get(1).map(|s| s.parse::<u64>()) {
        Some(Ok(ms)) => {
            shell.machine().sleep_ms(ms);
            shell.write_line(&format!("Slept {} ms", ms));
        }
        _ => shell.write_line("Usage: sleep <ms>"),
    }
}

fn snake(shell: &mut Shell<'_>, _args: &[&str]) {
    let now = shell.machine().uptime_ms();
    let mut game = SnakeGame::new();
    game.init(shell.screen(), now);
    shell.launch(Box::new(game));
}

fn selftest(shell: &mut Shell<'_>, _args: &[&str]) {
    test_env::run_all(shell);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::allocators::HeapStats;
    use crate::testing::{FakeMachine, MemoryScreen};
    use std::sync::Mutex;

    static SEEN: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn record_args(_shell: &mut Shell<'_>, args: &[&str]) {
        *SEEN.lock().unwrap() = args.iter().map(|s| s.to_string()).collect();
    }

    fn first(shell: &mut Shell<'_>, _args: &[&str]) {
        shell.write_line("first");
    }

    fn second(shell: &mut Shell<'_>, _args: &[&str]) {
        shell.write_line("second");
    }

    struct Rig {
        scrollback: Scrollback,
        screen: MemoryScreen,
        machine: FakeMachine,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                scrollback: Scrollback::new(),
                screen: MemoryScreen::new(),
                machine: FakeMachine::default(),
            }
        }

        fn run(&mut self, registry: &CommandRegistry, line: &str) -> (bool, bool) {
            let mut tokens = [""; MAX_TOKENS];
            let count = tokenize(line, &mut tokens);
            let mut shell = Shell::new(
                &mut self.scrollback,
                &mut self.screen,
                &mut self.machine,
                registry,
            );
            let matched = registry.dispatch(&mut shell, &tokens[..count]);
            (matched, shell.into_launch().is_some())
        }

        /// History lines, oldest first, column 0 stripped.
        fn output(&self) -> Vec<String> {
            (0..crate::config::SCROLLBACK_LINES)
                .rev()
                .map(|age| self.scrollback.line_text(age))
                .filter(|l| !l.is_empty())
                .map(|l| l[1..].to_string())
                .collect()
        }
    }

    #[test]
    fn test_tokenize() {
        let mut tokens = [""; MAX_TOKENS];
        assert_eq!(tokenize("  echo   foo bar ", &mut tokens), 3);
        assert_eq!(&tokens[..3], &["echo", "foo", "bar"]);
        assert_eq!(tokenize("", &mut tokens), 0);
        assert_eq!(tokenize("     ", &mut tokens), 0);
        assert_eq!(tokenize("a b c d e f g h i j", &mut tokens), MAX_TOKENS);
        assert_eq!(tokens[MAX_TOKENS - 1], "h");
    }

    #[test]
    fn test_handler_receives_all_tokens() {
        let mut registry = CommandRegistry::new();
        registry.register("record", None, record_args).unwrap();
        let mut rig = Rig::new();
        let (matched, _) = rig.run(&registry, "record foo");
        assert!(matched);
        assert_eq!(*SEEN.lock().unwrap(), vec!["record".to_string(), "foo".to_string()]);
    }

    #[test]
    fn test_unknown_command_message() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        let (matched, _) = rig.run(&registry, "zzz");
        assert!(!matched);
        assert_eq!(rig.output(), vec!["Command not recognized:", "zzz"]);
    }

    #[test]
    fn test_empty_input_does_nothing() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        let (matched, _) = rig.run(&registry, "   ");
        assert!(!matched);
        assert!(rig.output().is_empty());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = CommandRegistry::new();
        registry.register("dup", None, first).unwrap();
        registry.register("dup", None, second).unwrap();
        let mut rig = Rig::new();
        rig.run(&registry, "dup");
        assert_eq!(rig.output(), vec!["first"]);
    }

    #[test]
    fn test_registry_capacity() {
        let mut registry = CommandRegistry::new();
        for _ in 0..MAX_COMMANDS {
            registry.register("x", None, first).unwrap();
        }
        assert_eq!(registry.register("y", None, first), Err(RegistryError::Full));
        assert_eq!(CommandRegistry::new().register("", None, first), Err(RegistryError::EmptyName));
    }

    #[test]
    fn test_echo() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        rig.run(&registry, "echo hello   world");
        assert_eq!(rig.output(), vec!["hello world"]);
    }

    #[test]
    fn test_help_for_one_command() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        rig.run(&registry, "help help");
        assert_eq!(
            rig.output(),
            vec![
                "help",
                "Display all commands available.",
                "help <commandName> displays the help information for that command."
            ]
        );
    }

    #[test]
    fn test_help_without_text_and_unknown() {
        let mut registry = CommandRegistry::with_builtins();
        registry.register("bare", None, first).unwrap();
        let mut rig = Rig::new();
        rig.run(&registry, "help bare");
        rig.run(&registry, "help nothing");
        assert_eq!(rig.output(), vec!["bare", NO_HELP, NO_HELP]);
    }

    #[test]
    fn test_help_lists_every_command() {
        let mut registry = CommandRegistry::new();
        registry.register("one", Some("first"), first).unwrap();
        registry.register("two", None, second).unwrap();
        registry.register("help", None, help).unwrap();
        let mut rig = Rig::new();
        rig.run(&registry, "help");
        assert_eq!(
            rig.output(),
            vec![
                "Help------------------",
                "one",
                "first",
                "two",
                NO_HELP,
                "help",
                NO_HELP,
                "----------------------"
            ]
        );
    }

    #[test]
    fn test_clear() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        rig.run(&registry, "echo gone");
        rig.run(&registry, "clear");
        assert!(rig.output().is_empty());
        assert!(!rig.screen.contains("gone"));
    }

    #[test]
    fn test_shutdown_asks_machine() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        rig.run(&registry, "shutdown");
        assert_eq!(rig.machine.shutdowns, 1);
        assert_eq!(rig.output(), vec!["Attempting QEMU Shutdown..."]);
    }

    #[test]
    fn test_beep_defaults_and_arguments() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        rig.run(&registry, "beep");
        rig.run(&registry, "beep 440 50");
        rig.run(&registry, "beep loud");
        assert_eq!(rig.machine.beeps, vec![(DEFAULT_BEEP_HZ, DEFAULT_BEEP_MS), (440, 50)]);
        assert_eq!(rig.output(), vec!["Usage: beep [hz] [ms]"]);
    }

    #[test]
    fn test_sleep() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        rig.run(&registry, "sleep 25");
        rig.run(&registry, "sleep");
        assert_eq!(rig.machine.sleeps, vec![25]);
        assert_eq!(rig.output(), vec!["Slept 25 ms", "Usage: sleep <ms>"]);
    }

    #[test]
    fn test_uptime_and_sysinfo() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        rig.machine.now_ms = 12_345;
        rig.machine.stats = Some(HeapStats {
            capacity: 4096,
            free_bytes: 2048,
            free_blocks: 1,
            largest_free: 2048,
        });
        rig.run(&registry, "uptime");
        rig.run(&registry, "sysinfo");
        let out = rig.output();
        assert_eq!(out[0], "Uptime: 12.345 s");
        assert!(out.iter().any(|l| l.starts_with("Heap: 4 KiB total, 2 KiB free")));
        assert!(out.iter().any(|l| l == "Screen: 80x25 cells"));
    }

    #[test]
    fn test_snake_launches_visual_app() {
        let registry = CommandRegistry::with_builtins();
        let mut rig = Rig::new();
        let (matched, launched) = rig.run(&registry, "snake");
        assert!(matched && launched);
        assert_eq!(rig.screen.cell(0, 0), b'#');
    }

    #[test]
    fn test_builtins_are_all_documented() {
        let registry = CommandRegistry::with_builtins();
        assert_eq!(registry.len(), BUILTINS.len());
        assert!(registry.iter().all(|c| c.help.is_some()));
    }
}
