//! Application service — the hexagonal core.
//!
//! [`AccessService`] owns the decision engine and the actuation
//! controller.  All I/O flows through port traits injected at call sites,
//! making the entire service testable with mock adapters.
//!
//! Collaborator faults are reported once, as [`AppEvent`]s; rendering
//! them is the sink's job.
//!
//! ```text
//!  CredentialReader ──▶ ┌──────────────────────────┐ ──▶ TelemetryPort
//!  ClockPort        ──▶ │      AccessService        │ ──▶ EventSink
//!  SensorPort       ──▶ │  Engine · Actuation       │
//!  RelayPort        ◀── └──────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::access::actuation::ActuationController;
use crate::access::credential::{AuthorizedSet, CredentialVerifier, UidHex};
use crate::access::engine::{Decision, DecisionEngine, ScanEvent, Verdict};
use crate::access::telemetry::{GrantRecord, TelemetryRecord, UnauthorizedRecord};
use crate::config::SystemConfig;

use super::events::AppEvent;
use super::ports::{ClockPort, CredentialReader, EventSink, RelayPort, SensorPort, TelemetryPort};

// ───────────────────────────────────────────────────────────────
// AccessService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AccessService<V = AuthorizedSet> {
    engine: DecisionEngine<V>,
    actuation: ActuationController,
    publish_unauthorized_uid: bool,
    authorized: usize,
    cycles: u64,
}

impl AccessService<AuthorizedSet> {
    /// Construct the service from configuration.
    ///
    /// The configuration is assumed valid; adapters validate on load.
    pub fn new(config: &SystemConfig) -> Self {
        Self::with_engine(DecisionEngine::from_config(config), config)
    }
}

impl<V: CredentialVerifier> AccessService<V> {
    /// Construct around a prebuilt engine (custom verifier).
    pub fn with_engine(engine: DecisionEngine<V>, config: &SystemConfig) -> Self {
        Self {
            engine,
            actuation: ActuationController::from_config(config),
            publish_unauthorized_uid: config.publish_unauthorized_uid,
            authorized: config.authorized_uids.len(),
            cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Force the relay to its inactive level and announce readiness.
    pub fn start(&mut self, relay: &mut impl RelayPort, sink: &mut impl EventSink) {
        if let Err(e) = relay.release() {
            warn!("Relay: could not force inactive at start: {}", e);
        }
        sink.emit(&AppEvent::Started {
            authorized: self.authorized,
        });
        info!(
            "AccessService started ({:?} actuation)",
            self.actuation.mode()
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one control-loop iteration:
    /// day rollover → scheduled release → reader poll → decision → effects.
    ///
    /// The `hw` parameter satisfies [`SensorPort`], [`RelayPort`] and
    /// [`DelayNs`] at once, avoiding a double mutable borrow of the one
    /// board adapter.
    ///
    /// Returns the verdict if a credential was presented this cycle.
    pub fn run_cycle(
        &mut self,
        clock: &impl ClockPort,
        reader: &mut impl CredentialReader,
        hw: &mut (impl SensorPort + RelayPort + DelayNs),
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) -> Option<Verdict> {
        self.cycles += 1;

        // 1. Day-window check, every iteration, scan or not.
        if let Some(previous_count) = self.engine.roll_window(clock.calendar_secs()) {
            info!("Daily window rolled ({} grants in closed window)", previous_count);
            sink.emit(&AppEvent::DailyWindowRolled { previous_count });
        }

        // 2. End a scheduled pulse that is due.
        if self.actuation.poll(clock.monotonic_ms(), hw) {
            sink.emit(&AppEvent::RelayReleased);
        }

        // 3. Reader.
        let uid = match reader.poll() {
            Ok(Some(uid)) => uid,
            Ok(None) => return None,
            Err(e) => {
                sink.emit(&AppEvent::ReaderFault(e));
                // Leave the reader idle for the next cycle.
                if let Err(e) = reader.acknowledge() {
                    debug!("Reader acknowledge after fault failed: {}", e);
                }
                return None;
            }
        };

        // Both clocks are sampled when the reader surfaces the card.
        let event = ScanEvent {
            uid,
            monotonic_ms: clock.monotonic_ms(),
            calendar_secs: clock.calendar_secs(),
        };

        // 4. Decide.
        let decision = self.engine.decide(&event);
        sink.emit(&AppEvent::ScanEvaluated {
            uid: event.uid.clone(),
            verdict: decision.verdict,
            sequence: decision.sequence,
            granted_today: self.engine.granted_today(),
            cooldown_remaining_ms: self
                .engine
                .rate_limiter()
                .remaining_ms(event.monotonic_ms),
        });

        // 5. Effects.
        self.apply(&decision, &event, hw, telemetry, sink);

        if let Err(e) = reader.acknowledge() {
            sink.emit(&AppEvent::ReaderFault(e));
        }

        Some(decision.verdict)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn engine(&self) -> &DecisionEngine<V> {
        &self.engine
    }

    pub fn actuation(&self) -> &ActuationController {
        &self.actuation
    }

    /// Grants since boot.
    pub fn lifetime_grants(&self) -> u32 {
        self.engine.lifetime_grants()
    }

    /// Grants in the current daily window.
    pub fn granted_today(&self) -> u16 {
        self.engine.granted_today()
    }

    /// Loop iterations executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply(
        &mut self,
        decision: &Decision,
        event: &ScanEvent,
        hw: &mut (impl SensorPort + RelayPort + DelayNs),
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        let record = match decision.verdict {
            Verdict::Granted => {
                let sequence = decision.sequence.unwrap_or(0);
                let reading = hw.read_auxiliary();
                info!(
                    "Access granted to {} (#{}, {} today, sensor={})",
                    UidHex(&event.uid),
                    sequence,
                    self.engine.granted_today(),
                    reading
                );

                if let Err(e) = self.actuation.activate(event.monotonic_ms, hw) {
                    sink.emit(&AppEvent::ActuationFailed(e));
                }

                TelemetryRecord::Grant(GrantRecord::new(sequence, reading, event))
            }
            Verdict::DeniedUnauthorized => {
                info!("Access denied: unknown credential {}", UidHex(&event.uid));
                TelemetryRecord::Unauthorized(UnauthorizedRecord::new(
                    event,
                    self.publish_unauthorized_uid,
                ))
            }
            Verdict::DeniedRateLimited => {
                info!(
                    "Access denied: cooldown active ({} ms left)",
                    self.engine.rate_limiter().remaining_ms(event.monotonic_ms)
                );
                return;
            }
            Verdict::DeniedQuotaExceeded => {
                info!(
                    "Access denied: daily quota of {} reached",
                    self.engine.quota().max_daily()
                );
                return;
            }
        };

        if let Err(error) = telemetry.publish(&record) {
            sink.emit(&AppEvent::TelemetryDropped {
                kind: record.kind(),
                error,
            });
        }
    }
}
