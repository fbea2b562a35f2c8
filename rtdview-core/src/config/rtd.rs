//! RTD front end configuration

/// RTD sensor wiring
///
/// The converter only has a single 3-wire bit, so 2-wire and 4-wire
/// sensors produce the same configuration register state. The wiring
/// difference between them lives entirely on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WiringMode {
    TwoWire,
    #[default]
    ThreeWire,
    FourWire,
}

/// Mains noise rejection filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NoiseFilter {
    /// Reject 50 Hz mains (Europe, most of Asia)
    Hz50,
    /// Reject 60 Hz mains (power-on default of the converter)
    #[default]
    Hz60,
}

/// RTD channel configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtdConfig {
    /// Sensor wiring
    pub wiring: WiringMode,
    /// Noise filter
    pub filter: NoiseFilter,
    /// Sensor resistance at 0°C in ohms (100 for PT100, 1000 for PT1000)
    pub nominal_ohms: f32,
    /// Reference resistor on the board in ohms
    pub reference_ohms: f32,
    /// Lower fault threshold as a raw 16-bit code
    pub lower_threshold: u16,
    /// Upper fault threshold as a raw 16-bit code
    pub upper_threshold: u16,
}

impl RtdConfig {
    /// PT100 element with a 430 Ω reference
    pub const PT100: Self = Self {
        wiring: WiringMode::ThreeWire,
        filter: NoiseFilter::Hz60,
        nominal_ohms: 100.0,
        reference_ohms: 430.0,
        lower_threshold: 0x0000,
        upper_threshold: 0xFFFF,
    };

    /// PT1000 element with a 4300 Ω reference
    pub const PT1000: Self = Self {
        nominal_ohms: 1000.0,
        reference_ohms: 4300.0,
        ..Self::PT100
    };
}

impl Default for RtdConfig {
    fn default() -> Self {
        Self::PT100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_keep_reference_ratio() {
        let pt100 = RtdConfig::PT100;
        let pt1000 = RtdConfig::PT1000;
        assert_eq!(pt100.reference_ohms / pt100.nominal_ohms, 4.3);
        assert_eq!(pt1000.reference_ohms / pt1000.nominal_ohms, 4.3);
        assert_eq!(pt1000.wiring, pt100.wiring);
    }

    #[test]
    fn test_default_thresholds_never_trip() {
        let config = RtdConfig::default();
        assert_eq!(config.lower_threshold, 0);
        assert_eq!(config.upper_threshold, u16::MAX);
    }
}
