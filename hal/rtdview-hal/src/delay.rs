//! Blocking delay abstraction
//!
//! Drivers that must wait for a device (bias settling, conversion time)
//! call through this trait instead of sleeping directly, so a test double
//! can advance a virtual clock instead of blocking the host.

/// Blocking millisecond delay
pub trait DelayMs {
    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<T: DelayMs + ?Sized> DelayMs for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}
