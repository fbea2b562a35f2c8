//! Temperature sensor trait

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Reading does not map to a physical temperature
    OutOfRange,
    /// Bus or ADC conversion error
    ConversionError,
}

/// Trait for temperature sensors
///
/// Implementations handle the specific sensor type (RTD front end,
/// thermistor, thermocouple amplifier).
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    ///
    /// Takes `&mut self` because a reading usually drives the bus.
    fn read_celsius(&mut self) -> Result<f32, SensorError>;

    /// Read the current temperature as fixed-point with 0.1°C resolution
    ///
    /// For example, 45.5°C is returned as 455. Readings that do not fit
    /// in an `i16` are reported as [`SensorError::OutOfRange`].
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        celsius_to_x10(self.read_celsius()?)
    }

    /// Check if the sensor reading is valid
    fn is_valid(&mut self) -> bool {
        self.read_celsius().is_ok()
    }
}

/// Convert degrees Celsius to rounded 0.1°C fixed-point
pub fn celsius_to_x10(celsius: f32) -> Result<i16, SensorError> {
    let scaled = libm::roundf(celsius * 10.0);
    if !scaled.is_finite() || scaled < i16::MIN as f32 || scaled > i16::MAX as f32 {
        return Err(SensorError::OutOfRange);
    }
    Ok(scaled as i16)
}
