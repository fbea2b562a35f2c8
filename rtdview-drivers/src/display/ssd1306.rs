//! SSD1306 OLED display driver (I2C)
//!
//! Drives 128x32, 128x64 and 64x32 SSD1306 panels. Drawing happens in an
//! owned [`Framebuffer`]; nothing reaches the panel until [`Ssd1306::flush`]
//! streams the current render area in one data burst.
//!
//! # I2C Protocol
//!
//! Each write starts with a control byte:
//! - `0x00`: the rest of the write is a command stream
//! - `0x40`: the rest of the write is display RAM data
//!
//! Commands are sent one per write, like the panel vendors' reference code.

use heapless::Vec;
use rtdview_core::config::{DisplayConfig, DisplaySize};
use rtdview_hal::I2cBus;

use super::framebuffer::{
    Fill, FrameError, Framebuffer, PixelColor, RenderArea, MAX_BUFFER_LEN,
};

/// Control byte: command stream follows
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte: data stream follows
pub const CONTROL_DATA: u8 = 0x40;

/// Capacity of one data burst (control byte + full frame)
const BURST_CAPACITY: usize = MAX_BUFFER_LEN + 1;

/// SSD1306 commands
pub mod cmd {
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const DEACTIVATE_SCROLL: u8 = 0x2E;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_SEG_REMAP: u8 = 0xA0;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const DISPLAY_ALL_ON: u8 = 0xA5;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_COM_SCAN_INC: u8 = 0xC0;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
}

/// SSD1306 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ssd1306Error<E> {
    /// I2C transport error
    Bus(E),
    /// Framebuffer or render area contract violation
    Frame(FrameError),
}

impl<E> From<FrameError> for Ssd1306Error<E> {
    fn from(e: FrameError) -> Self {
        Ssd1306Error::Frame(e)
    }
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    framebuffer: Framebuffer,
    area: RenderArea,
}

impl<I2C> Ssd1306<I2C>
where
    I2C: I2cBus,
{
    /// Create a driver and run the controller initialization sequence
    ///
    /// The framebuffer starts cleared and the render area covers the
    /// whole panel.
    pub fn new(i2c: I2C, address: u8, size: DisplaySize) -> Result<Self, Ssd1306Error<I2C::Error>> {
        let mut display = Self {
            i2c,
            address,
            framebuffer: Framebuffer::new(size),
            area: RenderArea::full(size),
        };
        display.init()?;
        Ok(display)
    }

    /// Create a driver from a panel configuration
    ///
    /// Runs [`new`](Self::new), then applies contrast, rotation and
    /// inversion.
    pub fn from_config(i2c: I2C, config: &DisplayConfig) -> Result<Self, Ssd1306Error<I2C::Error>> {
        let mut display = Self::new(i2c, config.address, config.size)?;
        display.apply_config(config)?;
        Ok(display)
    }

    /// Release the I2C bus, dropping the framebuffer
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Send the controller initialization sequence
    ///
    /// Order follows the controller's power-up contract: the panel is off
    /// while addressing and timing are set, and scrolling is stopped before
    /// any RAM write. Resets the render area to the full panel.
    pub fn init(&mut self) -> Result<(), Ssd1306Error<I2C::Error>> {
        let geometry = self.framebuffer.size().geometry();

        let init_cmds: [u8; 26] = [
            cmd::DISPLAY_OFF,
            cmd::SET_MEMORY_MODE,
            0x00, // Horizontal addressing
            cmd::SET_START_LINE,
            cmd::SET_SEG_REMAP | 0x01, // Column 127 mapped to SEG0
            cmd::SET_MUX_RATIO,
            geometry.height - 1,
            cmd::SET_COM_SCAN_DEC, // Scan from COM[N-1] to COM0
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_COM_PINS,
            geometry.com_pins,
            cmd::SET_CLOCK_DIV,
            0x80, // Divide ratio 1, default oscillator
            cmd::SET_PRECHARGE,
            0xF1, // Vcc generated internally
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_CONTRAST,
            0xFF,
            cmd::DISPLAY_ALL_ON_RESUME,
            cmd::SET_NORMAL,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::DEACTIVATE_SCROLL,
            cmd::DISPLAY_ON,
        ];

        for &c in &init_cmds {
            self.send_command(c)?;
        }

        self.area = RenderArea::full(self.framebuffer.size());

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "SSD1306 at {=u8:#x} initialized ({=u8}x{=u8})",
            self.address,
            geometry.width,
            geometry.height
        );

        Ok(())
    }

    /// Apply contrast, rotation and inversion from a configuration
    pub fn apply_config(&mut self, config: &DisplayConfig) -> Result<(), Ssd1306Error<I2C::Error>> {
        self.set_contrast(config.contrast)?;
        self.set_rotated(config.rotated)?;
        self.set_inverted(config.inverted)
    }

    /// Send a single command byte
    pub fn send_command(&mut self, command: u8) -> Result<(), Ssd1306Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, command])
            .map_err(Ssd1306Error::Bus)
    }

    /// Invert display colors
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Ssd1306Error<I2C::Error>> {
        if inverted {
            self.send_command(cmd::SET_INVERSE)
        } else {
            self.send_command(cmd::SET_NORMAL)
        }
    }

    /// Rotate the panel 180°
    ///
    /// Flips both the segment remap and the COM scan direction.
    pub fn set_rotated(&mut self, rotated: bool) -> Result<(), Ssd1306Error<I2C::Error>> {
        let r = rotated as u8;
        self.send_command(cmd::SET_SEG_REMAP | r)?;
        self.send_command(cmd::SET_COM_SCAN_INC | (r << 3))
    }

    /// Turn the panel on or off (RAM is retained)
    pub fn set_power_on(&mut self, on: bool) -> Result<(), Ssd1306Error<I2C::Error>> {
        if on {
            self.send_command(cmd::DISPLAY_ON)
        } else {
            self.send_command(cmd::DISPLAY_OFF)
        }
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Ssd1306Error<I2C::Error>> {
        self.send_command(cmd::SET_CONTRAST)?;
        self.send_command(contrast)
    }

    /// Apply a pixel operation in the framebuffer (no bus traffic)
    pub fn set_pixel(
        &mut self,
        x: i16,
        y: i16,
        color: PixelColor,
    ) -> Result<(), Ssd1306Error<I2C::Error>> {
        Ok(self.framebuffer.set_pixel(x, y, color)?)
    }

    /// Fill the framebuffer (no bus traffic)
    pub fn clear(&mut self, fill: Fill) {
        self.framebuffer.fill(fill);
    }

    /// Select the window the next flush writes
    pub fn set_render_area(&mut self, area: RenderArea) -> Result<(), Ssd1306Error<I2C::Error>> {
        if !area.fits(self.framebuffer.size()) {
            return Err(FrameError::InvalidArea.into());
        }
        self.area = area;
        Ok(())
    }

    pub fn render_area(&self) -> RenderArea {
        self.area
    }

    /// Send the render area of the owned framebuffer to the panel
    pub fn flush(&mut self) -> Result<(), Ssd1306Error<I2C::Error>> {
        let window = self.framebuffer.window_bytes(&self.area)?;
        self.write_window(&window)
    }

    /// Send a caller-supplied buffer to the panel's render area
    ///
    /// `data` must already be laid out as the render window (page by page)
    /// and be exactly [`RenderArea::buffer_len`] bytes long.
    pub fn flush_from(&mut self, data: &[u8]) -> Result<(), Ssd1306Error<I2C::Error>> {
        let expected = self.area.buffer_len();
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                expected,
                actual: data.len(),
            }
            .into());
        }
        self.write_window(data)
    }

    /// Address the render area, then stream `data` as one data write
    fn write_window(&mut self, data: &[u8]) -> Result<(), Ssd1306Error<I2C::Error>> {
        let area = self.area;

        self.send_command(cmd::SET_COLUMN_ADDR)?;
        self.send_command(area.start_col())?;
        self.send_command(area.end_col())?;
        self.send_command(cmd::SET_PAGE_ADDR)?;
        self.send_command(area.start_page())?;
        self.send_command(area.end_page())?;

        let mut burst: Vec<u8, BURST_CAPACITY> = Vec::new();
        let too_long = FrameError::LengthMismatch {
            expected: area.buffer_len(),
            actual: data.len(),
        };
        burst.push(CONTROL_DATA).map_err(|_| too_long)?;
        burst.extend_from_slice(data).map_err(|_| too_long)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("SSD1306 flush {=usize} bytes", data.len());

        self.i2c
            .write(self.address, &burst)
            .map_err(Ssd1306Error::Bus)
    }

    pub fn size(&self) -> DisplaySize {
        self.framebuffer.size()
    }

    pub fn width(&self) -> u8 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> u8 {
        self.framebuffer.height()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Nack;

    /// I2C fake recording every write
    #[derive(Default)]
    struct RecordingI2c {
        writes: std::vec::Vec<(u8, std::vec::Vec<u8>)>,
        fail: bool,
    }

    impl RecordingI2c {
        /// Command bytes in order, checking each write is a single command
        fn commands(&self) -> std::vec::Vec<u8> {
            self.writes
                .iter()
                .filter(|(_, bytes)| bytes[0] == CONTROL_COMMAND)
                .map(|(_, bytes)| {
                    assert_eq!(bytes.len(), 2);
                    bytes[1]
                })
                .collect()
        }

        fn data_writes(&self) -> std::vec::Vec<&[u8]> {
            self.writes
                .iter()
                .filter(|(_, bytes)| bytes[0] == CONTROL_DATA)
                .map(|(_, bytes)| &bytes[1..])
                .collect()
        }
    }

    impl I2cBus for RecordingI2c {
        type Error = Nack;

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Nack> {
            if self.fail {
                return Err(Nack);
            }
            self.writes.push((address, data.to_vec()));
            Ok(())
        }
    }

    fn display(size: DisplaySize) -> Ssd1306<RecordingI2c> {
        let mut display = Ssd1306::new(RecordingI2c::default(), 0x3C, size).unwrap();
        display.i2c.writes.clear();
        display
    }

    #[test]
    fn test_init_sequence_128x32() {
        let display = Ssd1306::new(RecordingI2c::default(), 0x3C, DisplaySize::W128xH32).unwrap();

        assert!(display.i2c.writes.iter().all(|(addr, _)| *addr == 0x3C));
        assert_eq!(
            display.i2c.commands(),
            vec![
                0xAE, // off
                0x20, 0x00, // horizontal addressing
                0x40, // start line 0
                0xA1, // segment remap
                0xA8, 31, // multiplex
                0xC8, // COM scan decrement
                0xD3, 0x00, // offset
                0xDA, 0x02, // COM pins
                0xD5, 0x80, // clock
                0xD9, 0xF1, // pre-charge
                0xDB, 0x40, // VCOMH
                0x81, 0xFF, // contrast
                0xA4, // follow RAM
                0xA6, // normal
                0x8D, 0x14, // charge pump
                0x2E, // scroll off
                0xAF, // on
            ]
        );
        assert_eq!(display.render_area(), RenderArea::new(0, 127, 0, 3).unwrap());
        assert_eq!((display.width(), display.height()), (128, 32));
    }

    #[test]
    fn test_init_follows_panel_geometry() {
        let display = Ssd1306::new(RecordingI2c::default(), 0x3D, DisplaySize::W128xH64).unwrap();
        let commands = display.i2c.commands();

        let mux = commands.iter().position(|&c| c == cmd::SET_MUX_RATIO).unwrap();
        assert_eq!(commands[mux + 1], 63);
        let pins = commands.iter().position(|&c| c == cmd::SET_COM_PINS).unwrap();
        assert_eq!(commands[pins + 1], 0x12);
        assert_eq!(display.render_area().buffer_len(), 1024);

        let display = Ssd1306::new(RecordingI2c::default(), 0x3C, DisplaySize::W64xH32).unwrap();
        assert_eq!((display.width(), display.height()), (64, 32));
        assert_eq!(display.render_area(), RenderArea::new(0, 63, 0, 3).unwrap());
    }

    #[test]
    fn test_init_bus_error() {
        let i2c = RecordingI2c {
            fail: true,
            ..RecordingI2c::default()
        };
        let result = Ssd1306::new(i2c, 0x3C, DisplaySize::W128xH32);
        assert!(matches!(result, Err(Ssd1306Error::Bus(Nack))));
    }

    #[test]
    fn test_panel_commands() {
        let mut display = display(DisplaySize::W128xH32);

        display.set_inverted(true).unwrap();
        display.set_inverted(false).unwrap();
        display.set_rotated(true).unwrap();
        display.set_rotated(false).unwrap();
        display.set_power_on(false).unwrap();
        display.set_power_on(true).unwrap();
        display.set_contrast(0x7F).unwrap();
        display.send_command(cmd::DISPLAY_ALL_ON).unwrap();

        assert_eq!(
            display.i2c.commands(),
            vec![0xA7, 0xA6, 0xA1, 0xC8, 0xA0, 0xC0, 0xAE, 0xAF, 0x81, 0x7F, 0xA5]
        );
    }

    #[test]
    fn test_drawing_is_local_until_flush() {
        let mut display = display(DisplaySize::W128xH32);

        display.clear(Fill::Clear);
        display.set_pixel(3, 17, PixelColor::Set).unwrap();
        assert!(display.i2c.writes.is_empty());
        assert!(display.framebuffer().pixel(3, 17).unwrap());

        display.flush().unwrap();
        assert_eq!(display.i2c.commands(), vec![0x21, 0, 127, 0x22, 0, 3]);

        let data = display.i2c.data_writes();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].len(), 512);
        assert_eq!(data[0], display.framebuffer().as_bytes());
        assert_eq!(data[0][2 * 128 + 3], 0x02);
    }

    #[test]
    fn test_clear_set_flushes_all_ones() {
        let mut display = display(DisplaySize::W64xH32);
        display.clear(Fill::Set);
        display.flush().unwrap();

        let data = display.i2c.data_writes();
        assert_eq!(data[0].len(), 256);
        assert!(data[0].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let mut display = display(DisplaySize::W128xH32);
        assert_eq!(
            display.set_pixel(0, 32, PixelColor::Set),
            Err(Ssd1306Error::Frame(FrameError::OutOfBounds { x: 0, y: 32 }))
        );
        assert!(display.framebuffer().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_partial_render_area_flush() {
        let mut display = display(DisplaySize::W128xH32);
        display.set_pixel(11, 9, PixelColor::Set).unwrap();

        let area = RenderArea::new(10, 13, 1, 2).unwrap();
        display.set_render_area(area).unwrap();
        display.flush().unwrap();

        assert_eq!(display.i2c.commands(), vec![0x21, 10, 13, 0x22, 1, 2]);
        let data = display.i2c.data_writes();
        assert_eq!(data[0], &[0x00u8, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00][..]);
    }

    #[test]
    fn test_render_area_must_fit_panel() {
        let mut display = display(DisplaySize::W128xH32);
        let area = RenderArea::new(0, 127, 0, 7).unwrap();

        assert_eq!(
            display.set_render_area(area),
            Err(Ssd1306Error::Frame(FrameError::InvalidArea))
        );
        assert_eq!(display.render_area(), RenderArea::full(DisplaySize::W128xH32));
    }

    #[test]
    fn test_flush_from_external_buffer() {
        let mut display = display(DisplaySize::W128xH32);
        let external = [0xA5u8; 512];

        display.flush_from(&external).unwrap();

        let data = display.i2c.data_writes();
        assert_eq!(data[0], &external[..]);
        assert!(display.framebuffer().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_flush_from_wrong_length_sends_nothing() {
        let mut display = display(DisplaySize::W128xH32);

        assert_eq!(
            display.flush_from(&[0u8; 100]),
            Err(Ssd1306Error::Frame(FrameError::LengthMismatch {
                expected: 512,
                actual: 100
            }))
        );
        assert!(display.i2c.writes.is_empty());
    }

    #[test]
    fn test_init_resets_render_area() {
        let mut display = display(DisplaySize::W128xH64);
        display
            .set_render_area(RenderArea::new(0, 7, 0, 0).unwrap())
            .unwrap();

        display.init().unwrap();
        assert_eq!(display.render_area(), RenderArea::full(DisplaySize::W128xH64));
    }

    #[test]
    fn test_from_config() {
        let config = DisplayConfig {
            address: 0x3D,
            size: DisplaySize::W128xH64,
            contrast: 0x10,
            rotated: true,
            inverted: true,
        };
        let display = Ssd1306::from_config(RecordingI2c::default(), &config).unwrap();

        assert!(display.i2c.writes.iter().all(|(addr, _)| *addr == 0x3D));
        let commands = display.i2c.commands();
        assert_eq!(&commands[commands.len() - 5..], &[0x81u8, 0x10, 0xA1, 0xC8, 0xA7][..]);

        let i2c = display.release();
        assert!(!i2c.writes.is_empty());
    }
}
