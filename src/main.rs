//! RfidGate Firmware — Main Entry Point
//!
//! Hexagonal architecture: one synchronous control loop plus a telemetry
//! uplink thread.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Mfrc522 (SPI)     HardwareAdapter    NvsAdapter   Esp32Clock  │
//! │  (Reader)          (Sensor+Relay)     (Config)     (Clock)     │
//! │  LogEventSink      RemoteTelemetrySink ─▶ channel ─▶ Uplink    │
//! │  (EventSink)       (Telemetry)              (WiFi + HTTPS)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            AccessService (pure logic)                  │    │
//! │  │  Verifier · Quota · Cooldown · Actuation               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::sntp::EspSntp;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use rfidgate::adapters::hardware::HardwareAdapter;
use rfidgate::adapters::log_sink::LogEventSink;
use rfidgate::adapters::nvs::NvsAdapter;
use rfidgate::adapters::telemetry::{RemoteTelemetrySink, TELEMETRY_CHANNEL};
use rfidgate::adapters::time::Esp32Clock;
use rfidgate::adapters::uplink::{self, HttpStore, LoggingStore, Uplink};
use rfidgate::adapters::wifi::{ConnectivityPort, WifiAdapter};
use rfidgate::app::ports::{ConfigError, ConfigPort};
use rfidgate::app::service::AccessService;
use rfidgate::config::SystemConfig;
use rfidgate::drivers::hw_init;
use rfidgate::drivers::mfrc522::Mfrc522;
use rfidgate::drivers::relay::RelayDriver;
use rfidgate::pins;
use rfidgate::sensors::voltage::VoltageSensor;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let config = load_config();

    info!("╔══════════════════════════════════════╗");
    info!("║  RfidGate v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!(
        "{} authorized credential(s), cooldown {} ms, {} grants/day",
        config.authorized_uids.len(),
        config.cooldown_ms,
        config.max_daily_scans
    );

    // ── 4. Reader on VSPI ─────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let spi = SpiDriver::new(
        peripherals.spi3,
        peripherals.pins.gpio18,
        peripherals.pins.gpio23,
        Some(peripherals.pins.gpio19),
        &SpiDriverConfig::new(),
    )?;
    let device = SpiDeviceDriver::new(
        spi,
        Some(peripherals.pins.gpio5),
        &SpiConfig::new().baudrate(Hertz(pins::RFID_SPI_HZ)),
    )?;
    info!(
        "Reader: SPI SCK={} MISO={} MOSI={} SS={}",
        pins::RFID_SCK_GPIO,
        pins::RFID_MISO_GPIO,
        pins::RFID_MOSI_GPIO,
        pins::RFID_SS_GPIO
    );

    let mut reader = Mfrc522::new(device);
    if let Err(e) = reader.init(&mut FreeRtos) {
        error!("Reader init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 5. Board adapters ─────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        RelayDriver::new(pins::RELAY_GPIO),
        VoltageSensor::new(pins::VOLTAGE_ADC_GPIO),
    );
    let clock = Esp32Clock::new();
    let mut log_sink = LogEventSink::new();

    // ── 6. Network: WiFi, SNTP, uplink thread ─────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), None)?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(driver);
    match (option_env!("RFIDGATE_WIFI_SSID"), option_env!("RFIDGATE_WIFI_PASS")) {
        (Some(ssid), pass) => {
            if let Err(e) = wifi.set_credentials(ssid, pass.unwrap_or("")) {
                warn!("WiFi: {}", e);
            } else if let Err(e) = wifi.connect() {
                // The uplink keeps retrying with backoff.
                warn!("WiFi: initial connect failed ({}), continuing offline", e);
            }
        }
        (None, _) => warn!("WiFi: RFIDGATE_WIFI_SSID not set at build time, telemetry stays local"),
    }

    // Kept alive for the life of the process; syncs the calendar clock.
    let _sntp = EspSntp::new_default()?;

    let store = match (option_env!("RFIDGATE_DB_URL"), option_env!("RFIDGATE_DB_AUTH")) {
        (Some(url), Some(auth)) => HttpStore::new(url, auth),
        _ => None,
    };
    match store {
        Some(store) => {
            uplink::spawn(&TELEMETRY_CHANNEL, Uplink::new(store, wifi))?;
        }
        None => {
            warn!("Uplink: no datastore configured, frames are logged only");
            uplink::spawn(&TELEMETRY_CHANNEL, Uplink::new(LoggingStore::new(), wifi))?;
        }
    }
    let mut telemetry = RemoteTelemetrySink::new(&TELEMETRY_CHANNEL);

    // ── 7. App service ────────────────────────────────────────
    let mut app = AccessService::new(&config);
    app.start(&mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 8. Control loop ───────────────────────────────────────
    loop {
        app.run_cycle(&clock, &mut reader, &mut hw, &mut telemetry, &mut log_sink);
        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}

/// Stored config, or defaults (written back on first boot).
fn load_config() -> SystemConfig {
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            return SystemConfig::default();
        }
    };
    match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(ConfigError::NotFound) => {
            let cfg = SystemConfig::default();
            if let Err(e) = nvs.save(&cfg) {
                warn!("NVS: could not store defaults ({})", e);
            }
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    }
}
