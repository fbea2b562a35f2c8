//! rtdview Hardware Abstraction Layer
//!
//! This crate defines the transport capabilities the drivers depend on.
//! Drivers never name a concrete bus type; they are generic over these
//! traits, so the same code runs against a chip HAL on the target and
//! against a recording fake on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  rtdview-drivers (MAX31865, SSD1306)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rtdview-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │  host fakes   │
//! │   adapters    │       │  (tests)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`spi::SpiBus`] - Register write and exchange frames (one chip-select per call)
//! - [`i2c::I2cBus`] - Addressed I2C writes
//! - [`delay::DelayMs`] - Blocking millisecond delays

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod delay;
pub mod embedded;
pub mod i2c;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use delay::DelayMs;
pub use i2c::I2cBus;
pub use spi::SpiBus;
