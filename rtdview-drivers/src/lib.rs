//! Peripheral driver implementations
//!
//! Concrete drivers built on the transport traits in `rtdview-hal`:
//!
//! - RTD front end (MAX31865 over SPI) and the resistance to temperature
//!   solver it feeds
//! - Monochrome OLED (SSD1306 over I2C) with an owned page-addressed
//!   framebuffer and render-area flushes

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
pub mod sensor;
