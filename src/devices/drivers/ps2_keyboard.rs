//! # PS/2 Keyboard Driver
//!
//! ```text
//! ┌─────────────┐   IRQ1    ┌──────────────────┐  KeyCode  ┌──────────────┐
//! │  Keyboard   │──────────▶│ ScancodeDecoder  │──────────▶│  KEY_QUEUE   │
//! │  (Port 60)  │           │ - 0xE0 prefix    │           │ (32 entries) │
//! └─────────────┘           │ - drops releases │           └──────┬───────┘
//!                           └──────────────────┘                  │
//!                                                      main loop ◀┘
//! ```
//!
//! Decoding happens inside the interrupt handler so the queue carries
//! finished key events. The main loop only ever calls [`dequeue_key`].

use spin::Mutex;

use crate::config::KEY_QUEUE_CAPACITY;
use crate::data_structures::KeyQueue;
use crate::devices::input::KeyCode;

pub const EXTENDED_PREFIX: u8 = 0xE0;
const RELEASE_BIT: u8 = 0x80;

pub static KEY_QUEUE: KeyQueue<KEY_QUEUE_CAPACITY> = KeyQueue::new();

/// Only the keyboard handler takes this lock.
static DECODER: Mutex<ScancodeDecoder> = Mutex::new(ScancodeDecoder::new());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Normal,
    ExtendedPrefixSeen,
}

pub struct ScancodeDecoder {
    state: DecoderState,
}

impl ScancodeDecoder {
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Normal,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Feeds one byte from the controller. Returns a key on make codes of
    /// known keys; prefixes, releases and unknown codes yield nothing.
    pub fn process_scancode(&mut self, scancode: u8) -> Option<KeyCode> {
        if scancode == EXTENDED_PREFIX {
            // A repeated prefix keeps waiting for the real code.
            self.state = DecoderState::ExtendedPrefixSeen;
            return None;
        }

        let is_release = scancode & RELEASE_BIT != 0;
        match self.state {
            DecoderState::Normal => {
                if is_release {
                    None
                } else {
                    KeyCode::from_make_code(scancode)
                }
            }
            DecoderState::ExtendedPrefixSeen => {
                self.state = DecoderState::Normal;
                if is_release {
                    None
                } else {
                    KeyCode::from_extended(scancode)
                }
            }
        }
    }
}

impl Default for ScancodeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Called from the keyboard interrupt with the byte read from port 0x60.
pub(crate) fn on_scancode(scancode: u8) {
    if let Some(key) = DECODER.lock().process_scancode(scancode) {
        KEY_QUEUE.enqueue(key);
    }
}

pub fn dequeue_key() -> Option<KeyCode> {
    KEY_QUEUE.dequeue()
}
