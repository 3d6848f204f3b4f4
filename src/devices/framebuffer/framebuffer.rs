//! Framebuffer writer using embedded-graphics
use bootloader_api::info::{FrameBuffer, PixelFormat};
use embedded_graphics::{
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use spin::Mutex;

pub struct FramebufferWriter {
    framebuffer: &'static mut [u8],
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub bytes_per_pixel: usize,
    pixel_format: PixelFormat,
}

impl FramebufferWriter {
    pub fn new(fb: &'static mut FrameBuffer) -> Self {
        let info = fb.info();
        Self {
            framebuffer: fb.buffer_mut(),
            width: info.width,
            height: info.height,
            stride: info.stride,
            bytes_per_pixel: info.bytes_per_pixel,
            pixel_format: info.pixel_format,
        }
    }

    /// Fill entire screen with a color
    pub fn clear(&mut self, color: Rgb888) {
        let size = self.size();
        self.fill_rect(0, 0, size.width, size.height, color);
    }

    /// Fill a rectangular region
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgb888) {
        Rectangle::new(Point::new(x, y), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(self)
            .ok();
    }

    fn write_pixel(&mut self, offset: usize, color: Rgb888) {
        let pixel = &mut self.framebuffer[offset..offset + self.bytes_per_pixel];
        match self.pixel_format {
            PixelFormat::Rgb => {
                pixel[0] = color.r();
                pixel[1] = color.g();
                pixel[2] = color.b();
            }
            PixelFormat::U8 => {
                pixel[0] = ((color.r() as u16 + color.g() as u16 + color.b() as u16) / 3) as u8;
            }
            // Bgr and anything the bootloader reports that we do not know.
            _ => {
                pixel[0] = color.b();
                pixel[1] = color.g();
                pixel[2] = color.r();
            }
        }
    }
}

impl DrawTarget for FramebufferWriter {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let min_bytes = if matches!(self.pixel_format, PixelFormat::U8) { 1 } else { 3 };
        if self.bytes_per_pixel < min_bytes {
            return Ok(());
        }
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
                continue;
            }
            let offset = (y as usize * self.stride + x as usize) * self.bytes_per_pixel;
            if offset + self.bytes_per_pixel <= self.framebuffer.len() {
                self.write_pixel(offset, color);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for FramebufferWriter {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

pub static FRAMEBUFFER: Mutex<Option<FramebufferWriter>> = Mutex::new(None);

pub fn init_framebuffer(fb: &'static mut FrameBuffer) {
    let mut writer = FramebufferWriter::new(fb);
    writer.clear(Rgb888::BLACK);
    *FRAMEBUFFER.lock() = Some(writer);
}
