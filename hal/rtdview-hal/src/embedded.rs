//! Adapters from `embedded-hal` 1.0 onto the rtdview transport traits
//!
//! Board setup code usually owns `embedded-hal` implementations from the
//! chip HAL (an `SpiDevice` with its chip-select, an `I2c` peripheral, a
//! `DelayNs` timer). Wrapping them here lets the drivers stay generic over
//! [`SpiBus`], [`I2cBus`] and [`DelayMs`] only.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

use crate::delay::DelayMs;
use crate::i2c::I2cBus;
use crate::spi::SpiBus;

/// [`SpiBus`] over an `embedded-hal` [`SpiDevice`]
///
/// The device owns chip-select, so each trait call is one framed transaction.
pub struct EmbeddedSpi<D> {
    device: D,
}

impl<D: SpiDevice> EmbeddedSpi<D> {
    /// Wrap an SPI device
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Release the wrapped device
    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: SpiDevice> SpiBus for EmbeddedSpi<D> {
    type Error = D::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.device.write(data)
    }

    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        self.device.transfer_in_place(data)
    }
}

/// [`I2cBus`] over an `embedded-hal` [`I2c`] peripheral (7-bit addressing)
pub struct EmbeddedI2c<I> {
    i2c: I,
}

impl<I: I2c> EmbeddedI2c<I> {
    /// Wrap an I2C peripheral
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Release the wrapped peripheral
    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I: I2c> I2cBus for EmbeddedI2c<I> {
    type Error = I::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(address, data)
    }
}

/// [`DelayMs`] over an `embedded-hal` [`DelayNs`] timer
pub struct EmbeddedDelay<D> {
    delay: D,
}

impl<D: DelayNs> EmbeddedDelay<D> {
    /// Wrap a delay provider
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    /// Release the wrapped delay provider
    pub fn into_inner(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> DelayMs for EmbeddedDelay<D> {
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
