//! MAX31865 RTD-to-digital converter (SPI)
//!
//! The MAX31865 measures a platinum RTD ratiometrically against a board
//! reference resistor and reports a 15-bit code. This driver runs it in
//! one-shot mode with the bias voltage switched on only around each
//! conversion, which keeps sensor self-heating out of the readings.
//!
//! # SPI Protocol
//!
//! Every transaction is one chip-select frame:
//! - First byte: register address, bit 7 set for a write, clear for a read
//! - Following bytes: data written, or data clocked out by the device
//!
//! Multi-byte reads auto-increment the register address.
//!
//! # Configuration register
//!
//! Every setter re-reads the live configuration register and writes back a
//! modified copy. Nothing is cached on the host side, so the device stays
//! the single source of truth even if another setter ran in between.

use rtdview_core::config::{NoiseFilter, RtdConfig, WiringMode};
use rtdview_core::traits::{SensorError, TemperatureSensor};
use rtdview_hal::spi::{Mode, MODE_1};
use rtdview_hal::{DelayMs, SpiBus};

use super::cvd;

/// MAX31865 register addresses (read addresses; writes set bit 7)
pub mod reg {
    /// Configuration
    pub const CONFIG: u8 = 0x00;
    /// RTD result, high byte
    pub const RTD_MSB: u8 = 0x01;
    /// RTD result, low byte (bit 0 is the fault flag)
    pub const RTD_LSB: u8 = 0x02;
    /// High fault threshold, high byte
    pub const HFAULT_MSB: u8 = 0x03;
    /// High fault threshold, low byte
    pub const HFAULT_LSB: u8 = 0x04;
    /// Low fault threshold, high byte
    pub const LFAULT_MSB: u8 = 0x05;
    /// Low fault threshold, low byte
    pub const LFAULT_LSB: u8 = 0x06;
    /// Fault status
    pub const FAULT_STATUS: u8 = 0x07;
}

/// Configuration register bits
pub mod cfg {
    /// V_BIAS on
    pub const BIAS: u8 = 0x80;
    /// Continuous (auto) conversion
    pub const MODE_AUTO: u8 = 0x40;
    /// Start a single conversion (self-clearing)
    pub const ONE_SHOT: u8 = 0x20;
    /// 3-wire RTD
    pub const THREE_WIRE: u8 = 0x10;
    /// Fault detection cycle control (two bits)
    pub const FAULT_CYCLE: u8 = 0x0C;
    /// Clear fault status (self-clearing)
    pub const FAULT_CLEAR: u8 = 0x02;
    /// 50 Hz filter (60 Hz when clear)
    pub const FILTER_50HZ: u8 = 0x01;
}

/// Register address bit selecting a write
const WRITE_BIT: u8 = 0x80;

/// Longest burst read in a single chip-select frame
const MAX_BURST: usize = 8;

/// SPI mode supported by the MAX31865 (mode 3 also works)
pub const SPI_MODE: Mode = MODE_1;

/// Bias settling time before a conversion may start (ms)
pub const BIAS_SETTLE_MS: u32 = 10;

/// Time allowed for a one-shot conversion to complete (ms)
///
/// Worst case is 62.5 ms with the 50 Hz filter selected.
pub const CONVERSION_MS: u32 = 65;

/// MAX31865 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtdError<E> {
    /// SPI transport error
    Bus(E),
    /// Conversion result does not map to a temperature
    OutOfRange,
}

impl<E> From<RtdError<E>> for SensorError {
    fn from(e: RtdError<E>) -> Self {
        match e {
            RtdError::Bus(_) => SensorError::ConversionError,
            RtdError::OutOfRange => SensorError::OutOfRange,
        }
    }
}

/// Parsed fault status register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultStatus {
    /// RTD code above the high threshold
    pub high_threshold: bool,
    /// RTD code below the low threshold
    pub low_threshold: bool,
    /// REFIN- above 0.85 x V_BIAS
    pub refin_high: bool,
    /// REFIN- below 0.85 x V_BIAS (FORCE- open)
    pub refin_low: bool,
    /// RTDIN- below 0.85 x V_BIAS (FORCE- open)
    pub rtdin_low: bool,
    /// Overvoltage or undervoltage on an input
    pub over_under_voltage: bool,
}

impl FaultStatus {
    /// Parse from raw fault status register value
    pub fn from_register(value: u8) -> Self {
        Self {
            high_threshold: (value & (1 << 7)) != 0,
            low_threshold: (value & (1 << 6)) != 0,
            refin_high: (value & (1 << 5)) != 0,
            refin_low: (value & (1 << 4)) != 0,
            rtdin_low: (value & (1 << 3)) != 0,
            over_under_voltage: (value & (1 << 2)) != 0,
        }
    }

    /// Check if any fault condition is present
    pub fn has_fault(&self) -> bool {
        self.high_threshold
            || self.low_threshold
            || self.refin_high
            || self.refin_low
            || self.rtdin_low
            || self.over_under_voltage
    }
}

/// MAX31865 driver
///
/// Owns its SPI device (with chip-select) and a delay provider for the
/// bias settling and conversion waits.
pub struct Max31865<SPI, D> {
    spi: SPI,
    delay: D,
    /// Resistances used by the [`TemperatureSensor`] impl
    nominal_ohms: f32,
    reference_ohms: f32,
}

impl<SPI, D> Max31865<SPI, D>
where
    SPI: SpiBus,
    D: DelayMs,
{
    /// Create a new driver (no bus traffic)
    ///
    /// Resistances default to a PT100 with a 430 Ω reference until
    /// [`configure`](Self::configure) is called.
    pub fn new(spi: SPI, delay: D) -> Self {
        Self {
            spi,
            delay,
            nominal_ohms: RtdConfig::PT100.nominal_ohms,
            reference_ohms: RtdConfig::PT100.reference_ohms,
        }
    }

    /// Release the SPI device and delay provider
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }

    /// Bring the converter to a known idle state
    ///
    /// Sets the wiring mode, turns bias and auto-conversion off, opens the
    /// fault thresholds to the full range and clears any latched fault.
    pub fn init(&mut self, wiring: WiringMode) -> Result<(), RtdError<SPI::Error>> {
        self.set_wiring_mode(wiring)?;
        self.set_bias_enabled(false)?;
        self.set_auto_convert_enabled(false)?;
        self.set_fault_thresholds(0x0000, 0xFFFF)?;
        self.clear_fault()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("MAX31865 initialized ({})", wiring);

        Ok(())
    }

    /// Initialize from a channel configuration
    ///
    /// Runs [`init`](Self::init), then applies the filter and thresholds and
    /// keeps the resistances for [`TemperatureSensor::read_celsius`].
    pub fn configure(&mut self, config: &RtdConfig) -> Result<(), RtdError<SPI::Error>> {
        self.init(config.wiring)?;
        self.set_noise_filter(config.filter)?;
        self.set_fault_thresholds(config.lower_threshold, config.upper_threshold)?;
        self.nominal_ohms = config.nominal_ohms;
        self.reference_ohms = config.reference_ohms;
        Ok(())
    }

    /// Set the RTD wiring mode
    ///
    /// 2-wire and 4-wire both clear the 3-wire bit and are indistinguishable
    /// in the register.
    pub fn set_wiring_mode(&mut self, wiring: WiringMode) -> Result<(), RtdError<SPI::Error>> {
        let three_wire = wiring == WiringMode::ThreeWire;
        self.modify_config(|c| set_bit(c, cfg::THREE_WIRE, three_wire))
    }

    /// Turn the bias voltage on or off
    pub fn set_bias_enabled(&mut self, enabled: bool) -> Result<(), RtdError<SPI::Error>> {
        self.modify_config(|c| set_bit(c, cfg::BIAS, enabled))
    }

    /// Turn continuous conversion on or off
    pub fn set_auto_convert_enabled(&mut self, enabled: bool) -> Result<(), RtdError<SPI::Error>> {
        self.modify_config(|c| set_bit(c, cfg::MODE_AUTO, enabled))
    }

    /// Select the mains noise filter
    pub fn set_noise_filter(&mut self, filter: NoiseFilter) -> Result<(), RtdError<SPI::Error>> {
        let hz50 = filter == NoiseFilter::Hz50;
        self.modify_config(|c| set_bit(c, cfg::FILTER_50HZ, hz50))
    }

    /// Write the low and high fault thresholds as raw codes
    ///
    /// No ordering is enforced between the two.
    pub fn set_fault_thresholds(
        &mut self,
        lower: u16,
        upper: u16,
    ) -> Result<(), RtdError<SPI::Error>> {
        let [lower_msb, lower_lsb] = lower.to_be_bytes();
        let [upper_msb, upper_lsb] = upper.to_be_bytes();
        self.write_register(reg::LFAULT_LSB, lower_lsb)?;
        self.write_register(reg::LFAULT_MSB, lower_msb)?;
        self.write_register(reg::HFAULT_LSB, upper_lsb)?;
        self.write_register(reg::HFAULT_MSB, upper_msb)
    }

    /// Read the low fault threshold (raw code, not a temperature)
    pub fn lower_threshold(&mut self) -> Result<u16, RtdError<SPI::Error>> {
        self.read_register16(reg::LFAULT_MSB)
    }

    /// Read the high fault threshold (raw code, not a temperature)
    pub fn upper_threshold(&mut self) -> Result<u16, RtdError<SPI::Error>> {
        self.read_register16(reg::HFAULT_MSB)
    }

    /// Read the raw fault status register
    pub fn read_fault_status(&mut self) -> Result<u8, RtdError<SPI::Error>> {
        self.read_register(reg::FAULT_STATUS)
    }

    /// Read and decode the fault status register
    pub fn fault_status(&mut self) -> Result<FaultStatus, RtdError<SPI::Error>> {
        self.read_fault_status().map(FaultStatus::from_register)
    }

    /// Clear latched faults
    ///
    /// Drops the one-shot and fault-cycle bits and sets the fault-clear
    /// command bit in a single write.
    pub fn clear_fault(&mut self) -> Result<(), RtdError<SPI::Error>> {
        self.modify_config(|c| (c & !(cfg::ONE_SHOT | cfg::FAULT_CYCLE)) | cfg::FAULT_CLEAR)
    }

    /// Read the live configuration register
    pub fn config_register(&mut self) -> Result<u8, RtdError<SPI::Error>> {
        self.read_register(reg::CONFIG)
    }

    /// Run one biased one-shot conversion and return the 15-bit code
    ///
    /// Blocks for [`BIAS_SETTLE_MS`] + [`CONVERSION_MS`]. Once bias has been
    /// requested it is always turned off again before returning, whichever
    /// step failed. The first error wins.
    pub fn read_raw_conversion(&mut self) -> Result<u16, RtdError<SPI::Error>> {
        self.clear_fault()?;

        let result = self.biased_conversion();
        let bias_off = self.set_bias_enabled(false);
        let rtd = result?;
        bias_off?;

        #[cfg(feature = "defmt")]
        defmt::trace!("RTD register {=u16:#x} (fault flag {=bool})", rtd, rtd & 1 != 0);

        // Bit 0 is the fault flag
        Ok(rtd >> 1)
    }

    /// Bias on, settle, one-shot, wait, read the RTD register
    fn biased_conversion(&mut self) -> Result<u16, RtdError<SPI::Error>> {
        self.set_bias_enabled(true)?;
        self.delay.delay_ms(BIAS_SETTLE_MS);

        self.modify_config(|c| c | cfg::ONE_SHOT)?;
        self.delay.delay_ms(CONVERSION_MS);

        self.read_register16(reg::RTD_MSB)
    }

    /// Run a conversion and solve it to degrees Celsius
    ///
    /// Results outside the solver's valid domain are reported as
    /// [`RtdError::OutOfRange`] instead of a meaningless number.
    pub fn read_temperature(
        &mut self,
        nominal_ohms: f32,
        reference_ohms: f32,
    ) -> Result<f32, RtdError<SPI::Error>> {
        let raw = self.read_raw_conversion()?;
        cvd::try_solve_temperature(raw, nominal_ohms, reference_ohms).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("RTD code {=u16} out of range", raw);
            RtdError::OutOfRange
        })
    }

    /// Read consecutive registers starting at `addr`
    ///
    /// Longer reads are split into several frames; the device
    /// auto-increments within each one.
    pub fn read_registers(
        &mut self,
        addr: u8,
        buf: &mut [u8],
    ) -> Result<(), RtdError<SPI::Error>> {
        let mut addr = addr & !WRITE_BIT;
        for chunk in buf.chunks_mut(MAX_BURST) {
            let mut frame = [0u8; MAX_BURST + 1];
            let frame = &mut frame[..chunk.len() + 1];
            frame[0] = addr;
            self.spi.transfer_in_place(frame).map_err(RtdError::Bus)?;
            chunk.copy_from_slice(&frame[1..]);
            addr = addr.wrapping_add(chunk.len() as u8) & !WRITE_BIT;
        }
        Ok(())
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, RtdError<SPI::Error>> {
        let mut buf = [0u8; 1];
        self.read_registers(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a big-endian register pair starting at its high byte
    fn read_register16(&mut self, addr: u8) -> Result<u16, RtdError<SPI::Error>> {
        let mut buf = [0u8; 2];
        self.read_registers(addr, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), RtdError<SPI::Error>> {
        self.spi
            .write(&[addr | WRITE_BIT, value])
            .map_err(RtdError::Bus)
    }

    /// Read-modify-write of the configuration register
    fn modify_config(&mut self, f: impl FnOnce(u8) -> u8) -> Result<(), RtdError<SPI::Error>> {
        let current = self.read_register(reg::CONFIG)?;
        self.write_register(reg::CONFIG, f(current))
    }
}

impl<SPI, D> TemperatureSensor for Max31865<SPI, D>
where
    SPI: SpiBus,
    D: DelayMs,
{
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let (nominal, reference) = (self.nominal_ohms, self.reference_ohms);
        self.read_temperature(nominal, reference)
            .map_err(SensorError::from)
    }
}

fn set_bit(value: u8, mask: u8, on: bool) -> u8 {
    if on {
        value | mask
    } else {
        value & !mask
    }
}
