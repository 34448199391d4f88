//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AccessService (domain)
//! ```
//!
//! Driven adapters (clock, reader, relay, sensor, telemetry, storage)
//! implement these traits.  The [`AccessService`](super::service::AccessService)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.

use crate::access::credential::Uid;
use crate::access::telemetry::TelemetryRecord;
use crate::config::SystemConfig;
use crate::error::{ActuatorError, ReaderError, TelemetryError};

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Two independent time domains.
///
/// Cooldowns use only the monotonic clock; day rollover uses only the
/// calendar clock.
pub trait ClockPort {
    /// Milliseconds since boot.  Never goes backwards.
    fn monotonic_ms(&self) -> u64;

    /// Wall-clock Unix seconds, or `None` while not synchronised.
    fn calendar_secs(&self) -> Option<i64>;
}

// ───────────────────────────────────────────────────────────────
// Credential reader port
// ───────────────────────────────────────────────────────────────

/// Polled proximity-card reader.
pub trait CredentialReader {
    /// Return the UID of a newly presented card, if any.
    fn poll(&mut self) -> Result<Option<Uid>, ReaderError>;

    /// End the current card session so the next presentation is seen as
    /// new.  Called after every decision, whatever the verdict.
    fn acknowledge(&mut self) -> Result<(), ReaderError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port
// ───────────────────────────────────────────────────────────────

/// The auxiliary analog input sampled on each grant.
pub trait SensorPort {
    /// Raw reading; unit and scale are opaque to the domain.
    fn read_auxiliary(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Relay port
// ───────────────────────────────────────────────────────────────

/// The single binary output driving the lock.
pub trait RelayPort {
    /// Drive the output to its active level.
    fn energize(&mut self) -> Result<(), ActuatorError>;

    /// Return the output to its inactive level.
    fn release(&mut self) -> Result<(), ActuatorError>;

    fn is_energized(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Telemetry port
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget hand-off of records to the remote datastore.
///
/// Implementations must not block the control loop.  An `Err` is logged
/// by the caller and otherwise ignored.
pub trait TelemetryPort {
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port for operator visibility.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations validate with [`SystemConfig::validate`] on both
/// load and save; invalid values are rejected, never clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] if nothing was stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
