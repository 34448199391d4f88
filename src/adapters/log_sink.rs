//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::access::credential::UidHex;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ScanEvaluated {
                uid,
                verdict,
                sequence,
                granted_today,
                cooldown_remaining_ms,
            } => {
                info!(
                    "SCAN  | uid={} | {} | seq={} | today={} | cooldown_left={}ms",
                    UidHex(uid),
                    verdict,
                    sequence.unwrap_or(0),
                    granted_today,
                    cooldown_remaining_ms,
                );
            }
            AppEvent::DailyWindowRolled { previous_count } => {
                info!("QUOTA | window rolled, closed with {} grants", previous_count);
            }
            AppEvent::RelayReleased => {
                info!("RELAY | released");
            }
            AppEvent::ActuationFailed(e) => {
                warn!("RELAY | actuation failed: {}", e);
            }
            AppEvent::ReaderFault(e) => {
                warn!("READ  | {}", e);
            }
            AppEvent::TelemetryDropped { kind, error } => {
                warn!("TELEM | {} record dropped: {}", kind, error);
            }
            AppEvent::Started { authorized } => {
                info!("START | {} authorized credentials", authorized);
            }
        }
    }
}
