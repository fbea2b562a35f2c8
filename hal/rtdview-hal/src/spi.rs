//! SPI register access
//!
//! Register-addressed SPI peripherals only need two frame shapes: a write
//! of address plus data, and a full-duplex exchange where the address goes
//! out first and the register contents come back behind it.

pub use embedded_hal::spi::{Mode, Phase, Polarity, MODE_1};

/// SPI device on a bus
///
/// Every call is one complete chip-select frame: the implementation asserts
/// chip-select, clocks the bytes, and releases chip-select before returning.
/// Register-addressed devices rely on this, since the first byte of a frame
/// is the register address.
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Clock `data` out, discarding what comes back
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Clock `data` out and replace it with the bytes clocked in
    ///
    /// For a register read, `data[0]` holds the address and the rest of the
    /// buffer receives the register contents.
    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error>;
}
