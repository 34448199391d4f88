//! Outbound application events.
//!
//! The [`AccessService`](super::service::AccessService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  They are the
//! operator-visible trail of what the controller decided; the remote
//! datastore gets its own records through the telemetry port.

use crate::access::credential::Uid;
use crate::access::engine::Verdict;
use crate::error::{ActuatorError, ReaderError, TelemetryError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries the size of the authorized set).
    Started { authorized: usize },

    /// A presented credential was evaluated.
    ScanEvaluated {
        uid: Uid,
        verdict: Verdict,
        /// Lifetime grant number, for grants.
        sequence: Option<u32>,
        granted_today: u16,
        /// Cooldown left once the decision is taken: what remains for a
        /// rate-limited denial, the full cooldown after a grant.
        cooldown_remaining_ms: u64,
    },

    /// The daily window rolled over; carries the closed window's count.
    DailyWindowRolled { previous_count: u16 },

    /// A scheduled relay pulse ended.
    RelayReleased,

    /// The relay could not be driven for a grant.
    ActuationFailed(ActuatorError),

    /// The reader failed to poll or acknowledge.
    ReaderFault(ReaderError),

    /// A telemetry record was dropped.
    TelemetryDropped {
        kind: &'static str,
        error: TelemetryError,
    },
}
