//! I2C write transport
//!
//! Write-only command/data peripherals (display controllers and the like)
//! need nothing beyond an addressed write.

/// I2C bus master
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write, starting with the device's control byte
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;
}
