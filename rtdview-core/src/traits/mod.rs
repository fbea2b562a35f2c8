//! Hardware abstraction traits
//!
//! These traits define the interface between application logic
//! and sensor-specific implementations.

pub mod sensor;

pub use sensor::{SensorError, TemperatureSensor};
