//! Relay actuation controller.
//!
//! Holds the lock relay active for a fixed duration after each grant.
//! Two strategies, chosen by [`ActuationMode`]:
//!
//! - **Blocking** — energise, sleep for the duration, release.  The
//!   control loop sees no reader events and runs no day-window checks
//!   while the relay is held.  A failed release leaves the deadline set,
//!   so [`poll`](ActuationController::poll) keeps retrying it.
//! - **Scheduled** — energise and remember the release deadline.  The
//!   control loop calls [`poll`](ActuationController::poll) every
//!   iteration, which drops the relay once the deadline passes, so
//!   scanning continues during the pulse.
//!
//! Either way at most one actuation is in flight: `activate` while the
//! relay is still held returns [`ActuatorError::Busy`].

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::app::ports::RelayPort;
use crate::config::{ActuationMode, SystemConfig};
use crate::error::ActuatorError;

pub struct ActuationController {
    mode: ActuationMode,
    duration_ms: u32,
    /// Monotonic deadline of the in-flight scheduled pulse.
    release_at_ms: Option<u64>,
    pulses: u32,
}

impl ActuationController {
    pub fn new(mode: ActuationMode, duration_ms: u32) -> Self {
        Self {
            mode,
            duration_ms,
            release_at_ms: None,
            pulses: 0,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.actuation_mode, config.actuation_ms)
    }

    /// Start one relay pulse at monotonic time `now_ms`.
    ///
    /// `hw` drives the relay and, in blocking mode, provides the delay.
    pub fn activate(
        &mut self,
        now_ms: u64,
        hw: &mut (impl RelayPort + DelayNs),
    ) -> Result<(), ActuatorError> {
        if self.release_at_ms.is_some() {
            return Err(ActuatorError::Busy);
        }

        hw.energize()?;
        self.pulses = self.pulses.saturating_add(1);

        match self.mode {
            ActuationMode::Blocking => {
                info!("Relay: held for {} ms (blocking)", self.duration_ms);
                hw.delay_ms(self.duration_ms);
                hw.release().inspect_err(|e| {
                    error!("Relay: release after blocking pulse failed: {}, retrying", e);
                    // Already due: the next poll retries the release.
                    self.release_at_ms = Some(now_ms.saturating_add(self.duration_ms as u64));
                })
            }
            ActuationMode::Scheduled => {
                self.release_at_ms = Some(now_ms.saturating_add(self.duration_ms as u64));
                info!("Relay: held for {} ms (scheduled)", self.duration_ms);
                Ok(())
            }
        }
    }

    /// Release the relay if the scheduled pulse is due.
    ///
    /// Returns `true` on the iteration that released it.  A failed release
    /// keeps the deadline so the next poll tries again.
    pub fn poll(&mut self, now_ms: u64, relay: &mut impl RelayPort) -> bool {
        let Some(deadline) = self.release_at_ms else {
            return false;
        };
        if now_ms < deadline {
            return false;
        }
        match relay.release() {
            Ok(()) => {
                self.release_at_ms = None;
                true
            }
            Err(e) => {
                error!("Relay: scheduled release failed ({}), retrying", e);
                false
            }
        }
    }

    /// `true` while a pulse holds the relay: a scheduled pulse, or a
    /// blocking one whose release failed.
    pub fn is_active(&self) -> bool {
        self.release_at_ms.is_some()
    }

    /// Pulses started since boot.
    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    pub fn mode(&self) -> ActuationMode {
        self.mode
    }
}
