//! Lock relay driver (single-channel relay module, active HIGH).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO output via hw_init.
//! On host/test: hw_init latches the level in memory.

use log::warn;

use crate::drivers::hw_init;
use crate::error::ActuatorError;

pub struct RelayDriver {
    gpio: i32,
    energized: bool,
}

impl RelayDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            energized: false,
        }
    }

    pub fn energize(&mut self) -> Result<(), ActuatorError> {
        self.set_hw(true)?;
        self.energized = true;
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), ActuatorError> {
        self.set_hw(false)?;
        self.energized = false;
        Ok(())
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }

    fn set_hw(&self, on: bool) -> Result<(), ActuatorError> {
        hw_init::gpio_write(self.gpio, on).map_err(|rc| {
            warn!("Relay GPIO{} write failed (rc={})", self.gpio, rc);
            ActuatorError::GpioWriteFailed
        })
    }
}
