//! System configuration parameters
//!
//! All tunable parameters for the RfidGate controller.  Loaded once at
//! boot from NVS (or defaults) and fixed for the life of the process —
//! there is no hot reload.

use serde::{Deserialize, Serialize};

use crate::access::credential::{CredentialId, MAX_AUTHORIZED};
use crate::app::ports::ConfigError;

/// How the relay is held for the actuation duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuationMode {
    /// Energise, block the control loop for the duration, release.
    Blocking,
    /// Energise and let the control loop release it once the duration has
    /// elapsed.  The loop keeps polling the reader meanwhile.
    Scheduled,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Authorization ---
    /// Credentials allowed to open the lock (first match wins).
    pub authorized_uids: heapless::Vec<CredentialId, MAX_AUTHORIZED>,
    /// Include the presented UID in unauthorized-scan telemetry.
    pub publish_unauthorized_uid: bool,

    // --- Rate limiting ---
    /// Minimum time between two grants, across all credentials (ms)
    pub cooldown_ms: u32,
    /// Maximum grants per calendar-day window
    pub max_daily_scans: u16,

    // --- Actuation ---
    /// How long the relay is held active on a grant (ms)
    pub actuation_ms: u32,
    pub actuation_mode: ActuationMode,

    // --- Timing ---
    /// Control loop period (ms)
    pub loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut authorized_uids = heapless::Vec::new();
        // Capacity is 16; two pushes cannot fail.
        let _ = authorized_uids.push(CredentialId::new([0xD3, 0xF8, 0x02, 0x1E]));
        let _ = authorized_uids.push(CredentialId::new([0xA1, 0xB2, 0xC3, 0xD4]));

        Self {
            authorized_uids,
            publish_unauthorized_uid: true,

            cooldown_ms: 5_000,
            max_daily_scans: 100,

            actuation_ms: 2_000,
            actuation_mode: ActuationMode::Scheduled,

            loop_interval_ms: 50, // 20 Hz reader poll
        }
    }
}

impl SystemConfig {
    /// Range-check every field.
    ///
    /// Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authorized_uids.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "authorized_uids must contain at least one credential",
            ));
        }
        if !(500..=600_000).contains(&self.cooldown_ms) {
            return Err(ConfigError::ValidationFailed(
                "cooldown_ms must be 500–600000",
            ));
        }
        if !(1..=10_000).contains(&self.max_daily_scans) {
            return Err(ConfigError::ValidationFailed(
                "max_daily_scans must be 1–10000",
            ));
        }
        if !(50..=30_000).contains(&self.actuation_ms) {
            return Err(ConfigError::ValidationFailed(
                "actuation_ms must be 50–30000",
            ));
        }
        // A grant must never find the relay still held by the previous one.
        if self.cooldown_ms < self.actuation_ms {
            return Err(ConfigError::ValidationFailed(
                "cooldown_ms must be >= actuation_ms",
            ));
        }
        if !(10..=1_000).contains(&self.loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "loop_interval_ms must be 10–1000",
            ));
        }
        Ok(())
    }
}
