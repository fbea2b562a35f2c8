//! Display drivers
//!
//! - `framebuffer` - Page-packed monochrome framebuffer and render windows
//! - `ssd1306` - SSD1306 OLED controller over I2C

pub mod framebuffer;
pub mod ssd1306;

pub use framebuffer::{Fill, FrameError, Framebuffer, PixelColor, RenderArea};
pub use ssd1306::{Ssd1306, Ssd1306Error};
