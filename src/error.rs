//! Unified error types for the RfidGate firmware.
//!
//! Denials (unknown credential, cooldown, exhausted quota) are verdicts,
//! not errors; nothing here is raised for them.  What remains are the
//! failures of the collaborators around the decision engine: the
//! credential reader, the relay, and the telemetry hand-off.  All
//! variants are `Copy` so they can be logged and matched without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible collaborator operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The credential reader could not be polled or acknowledged.
    Reader(ReaderError),
    /// The relay could not be driven.
    Actuator(ActuatorError),
    /// A telemetry record could not be handed off or delivered.
    Telemetry(TelemetryError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reader(e) => write!(f, "reader: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Telemetry(e) => write!(f, "telemetry: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Reader errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderError {
    /// SPI transfer to the reader chip failed.
    Bus,
    /// The card did not answer before the reader's internal timer expired.
    Timeout,
    /// The reader flagged a protocol/parity/CRC/collision error.
    Protocol(u8),
    /// Anticollision returned a UID whose check byte does not match.
    BccMismatch,
    /// The reader chip reported an unexpected version (not wired / dead).
    NotDetected(u8),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "SPI bus error"),
            Self::Timeout => write!(f, "card response timeout"),
            Self::Protocol(flags) => write!(f, "protocol error (ErrorReg=0x{flags:02X})"),
            Self::BccMismatch => write!(f, "UID check byte mismatch"),
            Self::NotDetected(v) => write!(f, "reader not detected (version=0x{v:02X})"),
        }
    }
}

impl From<ReaderError> for Error {
    fn from(e: ReaderError) -> Self {
        Self::Reader(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// An actuation is already in flight; the relay is held by it.
    Busy,
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "actuation already in progress"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Telemetry errors
// ---------------------------------------------------------------------------

/// Telemetry failures are recoverable-and-ignored: they are logged and
/// never retried, and they never change a verdict already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    /// The record could not be serialised into a frame.
    Encode,
    /// The uplink queue is full; the frame was dropped.
    QueueFull,
    /// The network is not up.
    Offline,
    /// The remote datastore rejected the request (HTTP status).
    Rejected(u16),
    /// Transport-level failure talking to the datastore.
    Transport,
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "record encoding failed"),
            Self::QueueFull => write!(f, "uplink queue full"),
            Self::Offline => write!(f, "network offline"),
            Self::Rejected(status) => write!(f, "datastore rejected request (HTTP {status})"),
            Self::Transport => write!(f, "transport failure"),
        }
    }
}

impl From<TelemetryError> for Error {
    fn from(e: TelemetryError) -> Self {
        Self::Telemetry(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_subsystem_prefix() {
        let e: Error = ReaderError::Protocol(0x08).into();
        assert_eq!(e.to_string(), "reader: protocol error (ErrorReg=0x08)");
        let e: Error = TelemetryError::Rejected(401).into();
        assert_eq!(e.to_string(), "telemetry: datastore rejected request (HTTP 401)");
    }
}
