//! # Key codes

/// One key press, as delivered to the terminal and to visual apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct KeyCode(u8);

const EXTENDED_BIT: u8 = 0x80;

/// Printable characters by set-1 make code; 0 marks keys that print nothing.
const KEYMAP: &[u8; 58] = b"\0\01234567890-=\0\0qwertyuiop[]\0\0asdfghjkl;'`\0\\zxcvbnm,./\0\0\0 ";

impl KeyCode {
    pub const ESCAPE: Self = Self(0x01);
    pub const BACKSPACE: Self = Self(0x0E);
    pub const TAB: Self = Self(0x0F);
    pub const W: Self = Self(0x11);
    pub const ENTER: Self = Self(0x1C);
    pub const A: Self = Self(0x1E);
    pub const S: Self = Self(0x1F);
    pub const D: Self = Self(0x20);
    pub const LEFT_SHIFT: Self = Self(0x2A);
    pub const RIGHT_SHIFT: Self = Self(0x36);
    pub const SPACE: Self = Self(0x39);

    pub const ARROW_UP: Self = Self(0x48 | EXTENDED_BIT);
    pub const ARROW_LEFT: Self = Self(0x4B | EXTENDED_BIT);
    pub const ARROW_RIGHT: Self = Self(0x4D | EXTENDED_BIT);
    pub const ARROW_DOWN: Self = Self(0x50 | EXTENDED_BIT);

    /// Key for a plain (unprefixed) make code, `None` for codes no key
    /// on a standard layout produces.
    pub const fn from_make_code(code: u8) -> Option<Self> {
        match code {
            0x01..=0x36 | 0x38 | 0x39 | 0x3B..=0x44 | 0x57 | 0x58 => Some(Self(code)),
            _ => None,
        }
    }

    /// Key for the make code following an `0xE0` prefix.
    pub const fn from_extended(code: u8) -> Option<Self> {
        match code {
            0x48 | 0x4B | 0x4D | 0x50 => Some(Self(code | EXTENDED_BIT)),
            _ => None,
        }
    }

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_arrow(self) -> bool {
        matches!(self, Self::ARROW_UP | Self::ARROW_DOWN | Self::ARROW_LEFT | Self::ARROW_RIGHT)
    }

    /// Unshifted US layout character, if the key prints one.
    pub const fn to_char(self) -> Option<char> {
        let index = self.0 as usize;
        if index >= KEYMAP.len() || KEYMAP[index] == 0 {
            return None;
        }
        Some(KEYMAP[index] as char)
    }
}
