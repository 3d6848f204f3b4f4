//! Text-mode palette.
use embedded_graphics::pixelcolor::Rgb888;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

impl Color {
    const PALETTE: [(u8, u8, u8); 16] = [
        (0x00, 0x00, 0x00),
        (0x00, 0x00, 0xAA),
        (0x00, 0xAA, 0x00),
        (0x00, 0xAA, 0xAA),
        (0xAA, 0x00, 0x00),
        (0xAA, 0x00, 0xAA),
        (0xAA, 0x55, 0x00),
        (0xAA, 0xAA, 0xAA),
        (0x55, 0x55, 0x55),
        (0x55, 0x55, 0xFF),
        (0x55, 0xFF, 0x55),
        (0x55, 0xFF, 0xFF),
        (0xFF, 0x55, 0x55),
        (0xFF, 0x55, 0xFF),
        (0xFF, 0xFF, 0x55),
        (0xFF, 0xFF, 0xFF),
    ];
    const ALL: [Color; 16] = [
        Color::Black,
        Color::Blue,
        Color::Green,
        Color::Cyan,
        Color::Red,
        Color::Magenta,
        Color::Brown,
        Color::LightGray,
        Color::DarkGray,
        Color::LightBlue,
        Color::LightGreen,
        Color::LightCyan,
        Color::LightRed,
        Color::Pink,
        Color::Yellow,
        Color::White,
    ];

    pub const fn from_nibble(value: u8) -> Self {
        Self::ALL[(value & 0x0F) as usize]
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        Self::PALETTE[self as usize]
    }

    pub fn to_rgb888(self) -> Rgb888 {
        let (r, g, b) = self.rgb();
        Rgb888::new(r, g, b)
    }
}

/// Foreground in the low nibble, background in the high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const DEFAULT: ColorCode = ColorCode::new(Color::LightGray, Color::Black);

    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    pub const fn foreground(self) -> Color {
        Color::from_nibble(self.0)
    }

    pub const fn background(self) -> Color {
        Color::from_nibble(self.0 >> 4)
    }
}

impl Default for ColorCode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_code_nibbles() {
        let code = ColorCode::new(Color::Yellow, Color::Blue);
        assert_eq!(code.foreground(), Color::Yellow);
        assert_eq!(code.background(), Color::Blue);
        assert_eq!(ColorCode::DEFAULT.background(), Color::Black);
    }

    #[test]
    fn test_palette() {
        assert_eq!(Color::White.rgb(), (0xFF, 0xFF, 0xFF));
        assert_eq!(Color::Brown.rgb(), (0xAA, 0x55, 0x00));
        for n in 0..16u8 {
            assert_eq!(Color::from_nibble(n) as u8, n);
        }
    }
}
