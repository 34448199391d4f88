//! Integration tests for the boot-time config path: NVS → validate →
//! AccessService.

use crate::mock_hw::{LogSink, MockBoard, MockClock, MockReader, MockTelemetry};

use rfidgate::access::credential::CredentialId;
use rfidgate::access::engine::Verdict;
use rfidgate::adapters::nvs::NvsAdapter;
use rfidgate::app::ports::{ConfigError, ConfigPort};
use rfidgate::app::service::AccessService;
use rfidgate::config::SystemConfig;

#[test]
fn first_boot_writes_defaults_back() {
    let nvs = NvsAdapter::new().unwrap();
    assert_eq!(nvs.load().unwrap_err(), ConfigError::NotFound);

    nvs.save(&SystemConfig::default()).unwrap();
    let cfg = nvs.load().unwrap();
    assert_eq!(cfg.cooldown_ms, 5_000);
    assert_eq!(cfg.authorized_uids.len(), 2);
}

#[test]
fn stored_authorized_set_drives_decisions() {
    let nvs = NvsAdapter::new().unwrap();
    let mut stored = SystemConfig::default();
    stored.authorized_uids.clear();
    stored
        .authorized_uids
        .push(CredentialId::new([0x01, 0x02, 0x03, 0x04]))
        .unwrap();
    nvs.save(&stored).unwrap();

    let config = nvs.load().unwrap();
    let mut app = AccessService::new(&config);
    let clock = MockClock::new(None);
    let mut reader = MockReader::new();
    let mut board = MockBoard::new(0);
    let mut telemetry = MockTelemetry::new();
    let mut sink = LogSink::new();

    // The factory default credential is no longer accepted.
    reader.present(&[0xD3, 0xF8, 0x02, 0x1E]);
    reader.present(&[0x01, 0x02, 0x03, 0x04]);
    let first = app.run_cycle(&clock, &mut reader, &mut board, &mut telemetry, &mut sink);
    let second = app.run_cycle(&clock, &mut reader, &mut board, &mut telemetry, &mut sink);

    assert_eq!(first, Some(Verdict::DeniedUnauthorized));
    assert_eq!(second, Some(Verdict::Granted));
}

#[test]
fn seven_byte_uid_never_matches_a_four_byte_entry() {
    let config = SystemConfig::default();
    let mut app = AccessService::new(&config);
    let clock = MockClock::new(None);
    let mut reader = MockReader::new();
    let mut board = MockBoard::new(0);
    let mut telemetry = MockTelemetry::new();
    let mut sink = LogSink::new();

    reader.present(&[0xD3, 0xF8, 0x02, 0x1E, 0x00, 0x00, 0x00]);
    assert_eq!(
        app.run_cycle(&clock, &mut reader, &mut board, &mut telemetry, &mut sink),
        Some(Verdict::DeniedUnauthorized)
    );
}
