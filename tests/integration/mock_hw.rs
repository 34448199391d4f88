//! Mock adapters for integration tests.
//!
//! Each mock records what the service asked of it so tests can assert
//! on the full interaction history without touching real GPIO, SPI or
//! the network.

use std::cell::Cell;
use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use rfidgate::access::credential::Uid;
use rfidgate::access::telemetry::TelemetryRecord;
use rfidgate::app::events::AppEvent;
use rfidgate::app::ports::{
    ClockPort, CredentialReader, EventSink, RelayPort, SensorPort, TelemetryPort,
};
use rfidgate::error::{ActuatorError, ReaderError, TelemetryError};

pub fn uid(bytes: &[u8]) -> Uid {
    Uid::from_slice(bytes).unwrap()
}

// ── Clock ─────────────────────────────────────────────────────

/// Both time domains under test control.
pub struct MockClock {
    pub monotonic: Cell<u64>,
    pub calendar: Cell<Option<i64>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new(calendar: Option<i64>) -> Self {
        Self {
            monotonic: Cell::new(0),
            calendar: Cell::new(calendar),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.monotonic.set(self.monotonic.get() + ms);
    }

    pub fn advance_calendar(&self, secs: i64) {
        self.calendar.set(self.calendar.get().map(|c| c + secs));
    }
}

impl ClockPort for MockClock {
    fn monotonic_ms(&self) -> u64 {
        self.monotonic.get()
    }

    fn calendar_secs(&self) -> Option<i64> {
        self.calendar.get()
    }
}

// ── Reader ────────────────────────────────────────────────────

/// Replays a script of poll results; an empty script means "no card".
#[derive(Default)]
pub struct MockReader {
    pub script: VecDeque<Result<Option<Uid>, ReaderError>>,
    pub polls: u32,
    pub acks: u32,
    pub fail_ack: bool,
}

#[allow(dead_code)]
impl MockReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(&mut self, bytes: &[u8]) {
        self.script.push_back(Ok(Some(uid(bytes))));
    }

    pub fn fail_next(&mut self, e: ReaderError) {
        self.script.push_back(Err(e));
    }
}

impl CredentialReader for MockReader {
    fn poll(&mut self) -> Result<Option<Uid>, ReaderError> {
        self.polls += 1;
        self.script.pop_front().unwrap_or(Ok(None))
    }

    fn acknowledge(&mut self) -> Result<(), ReaderError> {
        self.acks += 1;
        if self.fail_ack {
            Err(ReaderError::Bus)
        } else {
            Ok(())
        }
    }
}

// ── Board (sensor + relay + delay) ────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCall {
    Energize,
    Release,
    Sleep(u32),
    ReadSensor,
}

pub struct MockBoard {
    pub calls: Vec<BoardCall>,
    pub energized: bool,
    pub sensor: u16,
    pub fail_energize: bool,
    pub fail_release: bool,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new(sensor: u16) -> Self {
        Self {
            calls: Vec::new(),
            energized: false,
            sensor,
            fail_energize: false,
            fail_release: false,
        }
    }

    pub fn pulses(&self) -> usize {
        self.calls.iter().filter(|c| **c == BoardCall::Energize).count()
    }

    pub fn releases(&self) -> usize {
        self.calls.iter().filter(|c| **c == BoardCall::Release).count()
    }
}

impl SensorPort for MockBoard {
    fn read_auxiliary(&mut self) -> u16 {
        self.calls.push(BoardCall::ReadSensor);
        self.sensor
    }
}

impl RelayPort for MockBoard {
    fn energize(&mut self) -> Result<(), ActuatorError> {
        if self.fail_energize {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.calls.push(BoardCall::Energize);
        self.energized = true;
        Ok(())
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        if self.fail_release {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.calls.push(BoardCall::Release);
        self.energized = false;
        Ok(())
    }

    fn is_energized(&self) -> bool {
        self.energized
    }
}

impl DelayNs for MockBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(BoardCall::Sleep(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(BoardCall::Sleep(ms));
    }
}

// ── Telemetry ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockTelemetry {
    pub records: Vec<TelemetryRecord>,
    pub fail_with: Option<TelemetryError>,
}

#[allow(dead_code)]
impl MockTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(e: TelemetryError) -> Self {
        Self {
            records: Vec::new(),
            fail_with: Some(e),
        }
    }
}

impl TelemetryPort for MockTelemetry {
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.records.push(record.clone());
        Ok(())
    }
}

// ── EventSink ─────────────────────────────────────────────────

/// Collects events for assertions.
#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
