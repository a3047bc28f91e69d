use crate::palette::Color;

/// Where rendered frames go
///
/// A frame is one [`set_pixel`](DisplaySink::set_pixel) per cell followed by
/// a single [`present`](DisplaySink::present).
pub trait DisplaySink {
    type Error;

    fn set_pixel(&mut self, x: usize, y: usize, color: Color);
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// A sink that drops every frame, for headless runs
#[derive(Debug, Default)]
pub struct NullSink {
    frames: u64,
}

impl NullSink {
    /// Frames presented so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DisplaySink for NullSink {
    type Error = std::convert::Infallible;

    #[inline]
    fn set_pixel(&mut self, _x: usize, _y: usize, _color: Color) {}

    fn present(&mut self) -> Result<(), Self::Error> {
        self.frames += 1;
        Ok(())
    }
}

/// A sink that keeps the last presented frame in memory
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    pixels: Vec<Color>,
    presented: Vec<Color>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            pixels: vec![Color::BLACK; width * height],
            presented: vec![Color::BLACK; width * height],
        }
    }

    /// Colour of `(x, y)` in the last presented frame
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.presented[y * self.width + x]
    }
}

impl DisplaySink for FrameBuffer {
    type Error = std::convert::Infallible;

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        self.pixels[y * self.width + x] = color;
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.presented.copy_from_slice(&self.pixels);
        Ok(())
    }
}
