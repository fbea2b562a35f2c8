//! Page-addressed 1-bit framebuffer
//!
//! The buffer mirrors the controller's GDDRAM in horizontal addressing
//! mode: `width` columns by `height / 8` pages, one byte per column per
//! page, LSB at the top. Pixel (x, y) lives in bit `y % 8` of byte
//! `(y / 8) * width + x`.
//!
//! Storage is a fixed-capacity array sized for the largest supported panel;
//! the active length comes from the [`DisplaySize`] table and every access
//! goes through a bounds check.

use heapless::Vec;
use rtdview_core::config::DisplaySize;

/// Capacity of the largest framebuffer
pub const MAX_BUFFER_LEN: usize = DisplaySize::MAX_BUFFER_LEN;

/// Framebuffer contract violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Pixel coordinate outside the panel
    OutOfBounds { x: i16, y: i16 },
    /// Render area inverted or outside the panel
    InvalidArea,
    /// Buffer length does not match the render area
    LengthMismatch { expected: usize, actual: usize },
}

/// Pixel operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelColor {
    /// Pixel on
    Set,
    /// Pixel off
    Clear,
    /// Toggle the pixel
    Invert,
}

/// Whole-buffer fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fill {
    /// All pixels on (0xFF)
    Set,
    /// All pixels off (0x00)
    Clear,
}

/// Rectangular window of columns and pages, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderArea {
    start_col: u8,
    end_col: u8,
    start_page: u8,
    end_page: u8,
}

impl RenderArea {
    /// Create a render area
    ///
    /// Fails with [`FrameError::InvalidArea`] if either range is inverted.
    pub fn new(
        start_col: u8,
        end_col: u8,
        start_page: u8,
        end_page: u8,
    ) -> Result<Self, FrameError> {
        if start_col > end_col || start_page > end_page {
            return Err(FrameError::InvalidArea);
        }
        Ok(Self {
            start_col,
            end_col,
            start_page,
            end_page,
        })
    }

    /// The whole panel
    pub const fn full(size: DisplaySize) -> Self {
        Self {
            start_col: 0,
            end_col: size.width() - 1,
            start_page: 0,
            end_page: size.pages() - 1,
        }
    }

    pub fn start_col(&self) -> u8 {
        self.start_col
    }

    pub fn end_col(&self) -> u8 {
        self.end_col
    }

    pub fn start_page(&self) -> u8 {
        self.start_page
    }

    pub fn end_page(&self) -> u8 {
        self.end_page
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        (self.end_col - self.start_col) as usize + 1
    }

    /// Number of pages
    pub fn pages(&self) -> usize {
        (self.end_page - self.start_page) as usize + 1
    }

    /// Bytes needed to cover this window
    pub fn buffer_len(&self) -> usize {
        self.columns() * self.pages()
    }

    /// Check that the window lies inside a panel of the given size
    pub fn fits(&self, size: DisplaySize) -> bool {
        self.end_col < size.width() && self.end_page < size.pages()
    }
}

/// Owned framebuffer for one panel
#[derive(Clone)]
pub struct Framebuffer {
    size: DisplaySize,
    buf: [u8; MAX_BUFFER_LEN],
}

impl Framebuffer {
    /// Create a cleared framebuffer for a panel size
    pub fn new(size: DisplaySize) -> Self {
        Self {
            size,
            buf: [0; MAX_BUFFER_LEN],
        }
    }

    pub fn size(&self) -> DisplaySize {
        self.size
    }

    pub fn width(&self) -> u8 {
        self.size.width()
    }

    pub fn height(&self) -> u8 {
        self.size.height()
    }

    /// Active length in bytes
    pub fn len(&self) -> usize {
        self.size.buffer_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw page-ordered bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    /// Raw page-ordered bytes, for bulk blits
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        &mut self.buf[..len]
    }

    /// Byte index and bit mask for a pixel
    fn locate(&self, x: i16, y: i16) -> Result<(usize, u8), FrameError> {
        let in_bounds =
            (0..self.width() as i16).contains(&x) && (0..self.height() as i16).contains(&y);
        if !in_bounds {
            return Err(FrameError::OutOfBounds { x, y });
        }
        let (x, y) = (x as usize, y as usize);
        Ok(((y / 8) * self.width() as usize + x, 1 << (y % 8)))
    }

    /// Apply a pixel operation
    pub fn set_pixel(&mut self, x: i16, y: i16, color: PixelColor) -> Result<(), FrameError> {
        let (index, mask) = self.locate(x, y)?;
        let byte = &mut self.buf[index];
        match color {
            PixelColor::Set => *byte |= mask,
            PixelColor::Clear => *byte &= !mask,
            PixelColor::Invert => *byte ^= mask,
        }
        Ok(())
    }

    /// Read back a pixel
    pub fn pixel(&self, x: i16, y: i16) -> Result<bool, FrameError> {
        let (index, mask) = self.locate(x, y)?;
        Ok(self.buf[index] & mask != 0)
    }

    /// Fill every pixel
    pub fn fill(&mut self, fill: Fill) {
        let value = match fill {
            Fill::Set => 0xFF,
            Fill::Clear => 0x00,
        };
        self.as_bytes_mut().fill(value);
    }

    /// Gather the bytes covered by a render area, page by page
    ///
    /// The result is laid out the way the controller consumes a windowed
    /// write: each page's columns in order, then the next page.
    pub fn window_bytes(
        &self,
        area: &RenderArea,
    ) -> Result<Vec<u8, MAX_BUFFER_LEN>, FrameError> {
        if !area.fits(self.size) {
            return Err(FrameError::InvalidArea);
        }

        let width = self.width() as usize;
        let mut out = Vec::new();
        for page in area.start_page as usize..=area.end_page as usize {
            let row = page * width;
            let start = row + area.start_col as usize;
            let end = row + area.end_col as usize;
            out.extend_from_slice(&self.buf[start..=end])
                .map_err(|_| FrameError::LengthMismatch {
                    expected: MAX_BUFFER_LEN,
                    actual: area.buffer_len(),
                })?;
        }
        Ok(out)
    }
}
