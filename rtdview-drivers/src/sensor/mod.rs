//! Temperature sensor drivers

pub mod cvd;
pub mod max31865;

pub use max31865::{FaultStatus, Max31865, RtdError};
