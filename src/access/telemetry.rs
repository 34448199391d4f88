//! Telemetry record shaping.
//!
//! Grants and unauthorized presentations each produce one write-once
//! record for the remote datastore.  Quota and cooldown denials stay
//! local.  Records carry the calendar timestamp of the scan (`null` when
//! the wall clock was not yet synchronised) plus the monotonic uptime so
//! entries can still be ordered.

use core::fmt::Write;

use serde::Serialize;

use crate::error::TelemetryError;

use super::credential::UidHex;
use super::engine::ScanEvent;

/// Published on every grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRecord {
    /// Lifetime grant number (1-based).
    pub sequence_count: u32,
    /// Raw auxiliary sensor reading sampled at grant time.
    pub sensor_reading: u16,
    pub granted_at: Option<i64>,
    pub uptime_ms: u64,
}

impl GrantRecord {
    pub fn new(sequence_count: u32, sensor_reading: u16, event: &ScanEvent) -> Self {
        Self {
            sequence_count,
            sensor_reading,
            granted_at: event.calendar_secs,
            uptime_ms: event.monotonic_ms,
        }
    }
}

/// Published on every unauthorized presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnauthorizedRecord {
    pub denied_at: Option<i64>,
    /// Presented UID as hex pairs, for auditing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<heapless::String<32>>,
    pub uptime_ms: u64,
}

impl UnauthorizedRecord {
    pub fn new(event: &ScanEvent, include_uid: bool) -> Self {
        let uid = include_uid.then(|| {
            let mut s = heapless::String::new();
            // 10 bytes render to 29 chars; fits.
            let _ = write!(s, "{}", UidHex(&event.uid));
            s
        });
        Self {
            denied_at: event.calendar_secs,
            uid,
            uptime_ms: event.monotonic_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryRecord {
    Grant(GrantRecord),
    Unauthorized(UnauthorizedRecord),
}

impl TelemetryRecord {
    /// JSON body for the datastore.
    pub fn to_json(&self) -> Result<Vec<u8>, TelemetryError> {
        match self {
            Self::Grant(r) => serde_json::to_vec(r),
            Self::Unauthorized(r) => serde_json::to_vec(r),
        }
        .map_err(|_| TelemetryError::Encode)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Grant(_) => "grant",
            Self::Unauthorized(_) => "unauthorized",
        }
    }
}
