//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the relay driver and the auxiliary sensor, exposing them through
//! [`SensorPort`] and [`RelayPort`], plus the blocking [`DelayNs`] the
//! actuation controller needs in blocking mode.  On non-espidf targets
//! the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{RelayPort, SensorPort};
use crate::drivers::relay::RelayDriver;
use crate::error::ActuatorError;
use crate::sensors::voltage::VoltageSensor;

/// Concrete adapter that combines the board's I/O behind port traits.
pub struct HardwareAdapter {
    relay: RelayDriver,
    voltage: VoltageSensor,
}

impl HardwareAdapter {
    pub fn new(relay: RelayDriver, voltage: VoltageSensor) -> Self {
        Self { relay, voltage }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_auxiliary(&mut self) -> u16 {
        self.voltage.read()
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl RelayPort for HardwareAdapter {
    fn energize(&mut self) -> Result<(), ActuatorError> {
        self.relay.energize()
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        self.relay.release()
    }

    fn is_energized(&self) -> bool {
        self.relay.is_energized()
    }
}

// ── Blocking delay ────────────────────────────────────────────

impl DelayNs for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        esp_idf_hal::delay::FreeRtos.delay_ns(ns);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    // Whole ticks yield to the scheduler instead of spinning.
    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }
}
