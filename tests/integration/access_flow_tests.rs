//! Integration tests for the reader → AccessService → relay/telemetry
//! pipeline.
//!
//! These run on the host and drive `AccessService::run_cycle` end to end
//! against the mocks in `mock_hw`, plus the real telemetry channel and
//! uplink simulation where noted.

use crate::mock_hw::{BoardCall, LogSink, MockBoard, MockClock, MockReader, MockTelemetry};

use rfidgate::access::engine::Verdict;
use rfidgate::access::telemetry::TelemetryRecord;
use rfidgate::adapters::log_sink::LogEventSink;
use rfidgate::adapters::telemetry::{RemoteTelemetrySink, TelemetryChannel, WriteOp};
use rfidgate::adapters::uplink::{LoggingStore, Uplink};
use rfidgate::adapters::wifi::{ConnectivityPort, WifiAdapter};
use rfidgate::app::events::AppEvent;
use rfidgate::app::service::AccessService;
use rfidgate::config::{ActuationMode, SystemConfig};
use rfidgate::error::{ReaderError, TelemetryError};

const KNOWN: [u8; 4] = [0xD3, 0xF8, 0x02, 0x1E];
const UNKNOWN: [u8; 4] = [0x00, 0x00, 0x00, 0x00];
const NOV_2023: i64 = 1_700_000_000;

struct Rig {
    app: AccessService,
    clock: MockClock,
    reader: MockReader,
    board: MockBoard,
    telemetry: MockTelemetry,
    sink: LogSink,
}

impl Rig {
    fn new(config: SystemConfig) -> Self {
        let mut app = AccessService::new(&config);
        let mut board = MockBoard::new(900);
        let mut sink = LogSink::new();
        app.start(&mut board, &mut sink);
        board.calls.clear();
        Self {
            app,
            clock: MockClock::new(Some(NOV_2023)),
            reader: MockReader::new(),
            board,
            telemetry: MockTelemetry::new(),
            sink,
        }
    }

    fn cycle(&mut self) -> Option<Verdict> {
        self.app.run_cycle(
            &self.clock,
            &mut self.reader,
            &mut self.board,
            &mut self.telemetry,
            &mut self.sink,
        )
    }

    fn scan(&mut self, uid: &[u8]) -> Option<Verdict> {
        self.reader.present(uid);
        self.cycle()
    }
}

// ── Scenarios ────────────────────────────────────────────────

#[test]
fn fresh_start_known_tag_is_granted_and_pulses_once() {
    let mut rig = Rig::new(SystemConfig::default());

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    assert_eq!(rig.app.granted_today(), 1);
    assert_eq!(rig.app.lifetime_grants(), 1);
    assert_eq!(rig.board.pulses(), 1);
    assert!(rig.board.energized, "scheduled pulse holds the relay");
}

#[test]
fn second_scan_inside_cooldown_is_rate_limited() {
    let mut rig = Rig::new(SystemConfig::default());

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    rig.clock.advance_ms(1_000);
    assert_eq!(rig.scan(&KNOWN), Some(Verdict::DeniedRateLimited));

    assert_eq!(rig.app.granted_today(), 1);
    assert_eq!(rig.board.pulses(), 1);
    let remaining = rig.sink.events.iter().rev().find_map(|e| match e {
        AppEvent::ScanEvaluated {
            cooldown_remaining_ms,
            ..
        } => Some(*cooldown_remaining_ms),
        _ => None,
    });
    assert_eq!(remaining, Some(4_000));
}

#[test]
fn grant_reports_the_full_cooldown_ahead() {
    let mut rig = Rig::new(SystemConfig::default());

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    let remaining = rig.sink.events.iter().find_map(|e| match e {
        AppEvent::ScanEvaluated {
            verdict: Verdict::Granted,
            cooldown_remaining_ms,
            ..
        } => Some(*cooldown_remaining_ms),
        _ => None,
    });
    assert_eq!(remaining, Some(5_000));
}

#[test]
fn unknown_tag_is_denied_without_actuation() {
    let mut rig = Rig::new(SystemConfig::default());

    assert_eq!(rig.scan(&UNKNOWN), Some(Verdict::DeniedUnauthorized));
    assert_eq!(rig.board.pulses(), 0);
    assert_eq!(rig.app.granted_today(), 0);

    // An unknown tag never starts the cooldown.
    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
}

#[test]
fn quota_of_two_grants_twice_then_denies() {
    let mut rig = Rig::new(SystemConfig {
        max_daily_scans: 2,
        ..SystemConfig::default()
    });

    let mut verdicts = Vec::new();
    for _ in 0..3 {
        verdicts.push(rig.scan(&KNOWN));
        rig.clock.advance_ms(5_000);
    }
    assert_eq!(
        verdicts,
        vec![
            Some(Verdict::Granted),
            Some(Verdict::Granted),
            Some(Verdict::DeniedQuotaExceeded)
        ]
    );
    assert_eq!(rig.app.granted_today(), 2);
    assert_eq!(rig.board.pulses(), 2);
}

#[test]
fn idle_controller_rolls_the_day_without_a_scan() {
    let mut rig = Rig::new(SystemConfig::default());
    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));

    rig.clock.advance_calendar(86_400);
    assert_eq!(rig.cycle(), None);

    assert_eq!(rig.app.granted_today(), 0);
    assert_eq!(rig.app.lifetime_grants(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::DailyWindowRolled { previous_count: 1 })),
        1
    );

    // Same day again: no second roll.
    rig.clock.advance_calendar(60);
    rig.cycle();
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::DailyWindowRolled { .. })),
        1
    );
}

#[test]
fn quota_exhausted_day_recovers_after_rollover() {
    let mut rig = Rig::new(SystemConfig {
        max_daily_scans: 1,
        ..SystemConfig::default()
    });
    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    rig.clock.advance_ms(10_000);
    assert_eq!(rig.scan(&KNOWN), Some(Verdict::DeniedQuotaExceeded));

    rig.clock.advance_calendar(86_400);
    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    assert_eq!(rig.app.lifetime_grants(), 2);
}

#[test]
fn unsynced_calendar_never_rolls_and_grants_count_against_first_window() {
    let mut rig = Rig::new(SystemConfig {
        max_daily_scans: 1,
        ..SystemConfig::default()
    });
    rig.clock.calendar.set(None);

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));

    // Clock syncs: the window is anchored now, the grant still counts.
    rig.clock.calendar.set(Some(NOV_2023));
    rig.clock.advance_ms(10_000);
    assert_eq!(rig.scan(&KNOWN), Some(Verdict::DeniedQuotaExceeded));
    assert_eq!(rig.app.engine().quota().window_start(), Some(NOV_2023));
}

// ── Reader acknowledgment ────────────────────────────────────

#[test]
fn reader_is_acknowledged_after_every_verdict() {
    let mut rig = Rig::new(SystemConfig {
        max_daily_scans: 1,
        ..SystemConfig::default()
    });

    rig.scan(&KNOWN); // granted
    rig.clock.advance_ms(100);
    rig.scan(&KNOWN); // quota
    rig.scan(&UNKNOWN); // unauthorized
    assert_eq!(rig.reader.acks, 3);

    // No card: nothing to acknowledge.
    rig.cycle();
    assert_eq!(rig.reader.acks, 3);
}

#[test]
fn reader_fault_is_reported_and_reader_still_acknowledged() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.reader.fail_next(ReaderError::Timeout);

    assert_eq!(rig.cycle(), None);
    assert_eq!(rig.reader.acks, 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::ReaderFault(ReaderError::Timeout))),
        1
    );

    // The next presentation is handled normally.
    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
}

#[test]
fn failed_acknowledge_does_not_undo_the_grant() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.reader.fail_ack = true;

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    assert_eq!(rig.app.granted_today(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::ReaderFault(ReaderError::Bus))),
        1
    );
}

// ── Relay pulses ─────────────────────────────────────────────

#[test]
fn scheduled_pulse_is_released_by_the_loop() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.scan(&KNOWN);

    rig.clock.advance_ms(1_999);
    rig.cycle();
    assert!(rig.board.energized);
    assert_eq!(rig.board.releases(), 0);

    rig.clock.advance_ms(1);
    rig.cycle();
    assert!(!rig.board.energized);
    assert_eq!(rig.board.releases(), 1);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::RelayReleased)), 1);
    assert!(!rig.app.actuation().is_active());
}

#[test]
fn reader_keeps_polling_during_a_scheduled_pulse() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.scan(&KNOWN);

    rig.clock.advance_ms(500);
    assert_eq!(rig.scan(&UNKNOWN), Some(Verdict::DeniedUnauthorized));
    assert!(rig.board.energized);
}

#[test]
fn blocking_pulse_sleeps_then_releases() {
    let mut rig = Rig::new(SystemConfig {
        actuation_mode: ActuationMode::Blocking,
        ..SystemConfig::default()
    });

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    assert_eq!(
        rig.board.calls,
        vec![
            BoardCall::ReadSensor,
            BoardCall::Energize,
            BoardCall::Sleep(2_000),
            BoardCall::Release,
        ]
    );
    assert!(!rig.app.actuation().is_active());
}

#[test]
fn failed_blocking_release_is_retried_on_the_next_cycle() {
    let mut rig = Rig::new(SystemConfig {
        actuation_mode: ActuationMode::Blocking,
        ..SystemConfig::default()
    });
    rig.board.fail_release = true;

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    assert!(rig.board.energized);
    assert!(rig.app.actuation().is_active());

    rig.board.fail_release = false;
    rig.clock.advance_ms(2_000);
    rig.cycle();
    assert!(!rig.board.energized);
    assert!(!rig.app.actuation().is_active());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::RelayReleased)), 1);
}

#[test]
fn relay_failure_keeps_the_verdict_and_reports() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.board.fail_energize = true;

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    assert_eq!(rig.app.granted_today(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::ActuationFailed(_))),
        1
    );
    // Grant telemetry is still published.
    assert_eq!(rig.telemetry.records.len(), 1);
}

#[test]
fn start_forces_relay_inactive() {
    let config = SystemConfig::default();
    let mut app = AccessService::new(&config);
    let mut board = MockBoard::new(0);
    board.energized = true;
    let mut sink = LogSink::new();

    app.start(&mut board, &mut sink);

    assert!(!board.energized);
    assert!(matches!(
        sink.events.first(),
        Some(AppEvent::Started { authorized: 2 })
    ));
}

// ── Telemetry ────────────────────────────────────────────────

#[test]
fn grant_and_unauthorized_records_have_expected_shape() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.clock.advance_ms(42);
    rig.scan(&KNOWN);
    rig.scan(&UNKNOWN);

    match &rig.telemetry.records[..] {
        [TelemetryRecord::Grant(g), TelemetryRecord::Unauthorized(u)] => {
            assert_eq!(g.sequence_count, 1);
            assert_eq!(g.sensor_reading, 900);
            assert_eq!(g.granted_at, Some(NOV_2023));
            assert_eq!(g.uptime_ms, 42);
            assert_eq!(u.denied_at, Some(NOV_2023));
            assert_eq!(u.uid.as_deref(), Some("00 00 00 00"));
        }
        other => panic!("unexpected records: {other:?}"),
    }
}

#[test]
fn cooldown_and_quota_denials_publish_nothing() {
    let mut rig = Rig::new(SystemConfig {
        max_daily_scans: 1,
        ..SystemConfig::default()
    });
    rig.scan(&KNOWN);
    rig.scan(&KNOWN); // quota exhausted
    rig.clock.advance_ms(10_000);
    rig.scan(&KNOWN);

    assert_eq!(rig.telemetry.records.len(), 1);
}

#[test]
fn unauthorized_uid_can_be_withheld() {
    let mut rig = Rig::new(SystemConfig {
        publish_unauthorized_uid: false,
        ..SystemConfig::default()
    });
    rig.scan(&UNKNOWN);

    match rig.telemetry.records.first() {
        Some(TelemetryRecord::Unauthorized(u)) => assert_eq!(u.uid, None),
        other => panic!("unexpected record: {other:?}"),
    }
}

#[test]
fn telemetry_failure_never_changes_state() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.telemetry = MockTelemetry::failing(TelemetryError::QueueFull);

    assert_eq!(rig.scan(&KNOWN), Some(Verdict::Granted));
    assert_eq!(rig.scan(&UNKNOWN), Some(Verdict::DeniedUnauthorized));

    assert_eq!(rig.app.granted_today(), 1);
    assert_eq!(rig.board.pulses(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::TelemetryDropped {
                error: TelemetryError::QueueFull,
                ..
            }
        )),
        2
    );
}

#[test]
fn records_flow_through_channel_to_uplink() {
    let channel = TelemetryChannel::new();
    let config = SystemConfig::default();
    let mut app = AccessService::new(&config);
    let clock = MockClock::new(Some(NOV_2023));
    let mut reader = MockReader::new();
    let mut board = MockBoard::new(512);
    let mut telemetry = RemoteTelemetrySink::new(&channel);
    let mut sink = LogEventSink::new();

    app.start(&mut board, &mut sink);
    reader.present(&KNOWN);
    app.run_cycle(&clock, &mut reader, &mut board, &mut telemetry, &mut sink);
    reader.present(&UNKNOWN);
    app.run_cycle(&clock, &mut reader, &mut board, &mut telemetry, &mut sink);

    let grant = channel.try_receive().unwrap();
    assert_eq!(grant.op, WriteOp::Update);
    assert_eq!(
        core::str::from_utf8(&grant.body).unwrap(),
        r#"{"sequenceCount":1,"sensorReading":512,"grantedAt":1700000000,"uptimeMs":0}"#
    );
    let denied = channel.try_receive().unwrap();
    assert_eq!(denied.op, WriteOp::Push);
    assert_eq!(
        core::str::from_utf8(&denied.body).unwrap(),
        r#"{"deniedAt":1700000000,"uid":"00 00 00 00","uptimeMs":0}"#
    );

    // Re-queue both and let a simulated uplink drain them.
    channel.try_send(grant).unwrap();
    channel.try_send(denied).unwrap();
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials("GateNet", "password1").unwrap();
    wifi.connect().unwrap();
    let mut uplink = Uplink::new(LoggingStore::new(), wifi);
    assert_eq!(uplink.drain_pending(&channel), 2);
    assert_eq!(uplink.store().sent(), 2);
}
