//! OLED panel configuration

/// Physical panel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    /// Width in pixels (columns)
    pub width: u8,
    /// Height in pixels (rows)
    pub height: u8,
    /// COM pins hardware configuration byte for this panel layout
    pub com_pins: u8,
}

/// Supported panel sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplaySize {
    #[default]
    W128xH32,
    W128xH64,
    W64xH32,
}

impl DisplaySize {
    /// Every supported size
    pub const ALL: [DisplaySize; 3] = [Self::W128xH32, Self::W128xH64, Self::W64xH32];

    /// Largest framebuffer any supported size needs, in bytes
    pub const MAX_BUFFER_LEN: usize = 128 * 64 / 8;

    /// Panel geometry
    pub const fn geometry(self) -> Geometry {
        match self {
            Self::W128xH32 => Geometry {
                width: 128,
                height: 32,
                com_pins: 0x02, // sequential COM, no left/right remap
            },
            Self::W128xH64 => Geometry {
                width: 128,
                height: 64,
                com_pins: 0x12, // alternative COM
            },
            Self::W64xH32 => Geometry {
                width: 64,
                height: 32,
                com_pins: 0x12,
            },
        }
    }

    /// Width in pixels
    pub const fn width(self) -> u8 {
        self.geometry().width
    }

    /// Height in pixels
    pub const fn height(self) -> u8 {
        self.geometry().height
    }

    /// Number of 8-row pages
    pub const fn pages(self) -> u8 {
        self.height() / 8
    }

    /// Framebuffer length in bytes (one bit per pixel)
    pub const fn buffer_len(self) -> usize {
        self.width() as usize * self.pages() as usize
    }
}

/// OLED panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// 7-bit I2C address (0x3C or 0x3D)
    pub address: u8,
    /// Panel size
    pub size: DisplaySize,
    /// Contrast (0-255)
    pub contrast: u8,
    /// Rotate 180°
    pub rotated: bool,
    /// Invert pixel polarity
    pub inverted: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            address: 0x3C,
            size: DisplaySize::W128xH32,
            contrast: 0xFF,
            rotated: false,
            inverted: false,
        }
    }
}
