//! Board-agnostic core types for the rtdview drivers
//!
//! This crate contains everything that does not depend on a bus:
//!
//! - The temperature sensor trait and its error type
//! - Configuration types for the RTD front end and the OLED panel

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod traits;
