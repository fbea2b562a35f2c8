//! Configuration types
//!
//! These types describe how a board wires up its RTD channel and its OLED
//! panel. Board setup code builds them and hands them to the drivers.

pub mod display;
pub mod rtd;

pub use display::{DisplayConfig, DisplaySize, Geometry};
pub use rtd::{NoiseFilter, RtdConfig, WiringMode};
