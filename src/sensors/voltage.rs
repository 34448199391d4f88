//! Auxiliary voltage sensor (resistive divider into ADC1).
//!
//! Reports the raw 12-bit ADC count; scaling is left to whoever consumes
//! the telemetry.  Each reading averages a few conversions to take the
//! edge off ADC noise.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH0 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_VOLTAGE_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_voltage_adc(raw: u16) {
    SIM_VOLTAGE_ADC.store(raw, Ordering::Relaxed);
}

/// Conversions averaged per reading.
const OVERSAMPLE: u32 = 4;

/// 12-bit full scale.
pub const ADC_MAX: u16 = 4095;

pub struct VoltageSensor {
    last_raw: u16,
    _adc_gpio: i32,
}

impl VoltageSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            last_raw: 0,
            _adc_gpio: adc_gpio,
        }
    }

    /// Take one averaged reading.
    pub fn read(&mut self) -> u16 {
        let sum: u32 = (0..OVERSAMPLE).map(|_| u32::from(self.read_adc())).sum();
        self.last_raw = (sum / OVERSAMPLE).min(u32::from(ADC_MAX)) as u16;
        self.last_raw
    }

    /// Most recent value returned by [`read`](Self::read).
    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_VOLTAGE)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_VOLTAGE_ADC.load(Ordering::Relaxed)
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn reads_injected_value_clamped_to_full_scale() {
        let mut s = VoltageSensor::new(36);
        sim_set_voltage_adc(2_048);
        assert_eq!(s.read(), 2_048);
        assert_eq!(s.last_raw(), 2_048);

        sim_set_voltage_adc(u16::MAX);
        assert_eq!(s.read(), ADC_MAX);
    }
}
