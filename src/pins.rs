//! GPIO / peripheral pin assignments for the RfidGate controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Target is a classic ESP32 (WROOM-32) devkit with an MFRC522 breakout on
//! VSPI and a single-channel relay module.

// ---------------------------------------------------------------------------
// MFRC522 proximity reader (VSPI)
// ---------------------------------------------------------------------------

/// SPI chip select (SDA on most breakouts).
pub const RFID_SS_GPIO: i32 = 5;
/// Reader hard reset, active LOW.
pub const RFID_RST_GPIO: i32 = 27;
pub const RFID_SCK_GPIO: i32 = 18;
pub const RFID_MISO_GPIO: i32 = 19;
pub const RFID_MOSI_GPIO: i32 = 23;

/// SPI clock.  The MFRC522 tops out at 10 MHz; 4 MHz is reliable on
/// jumper wires.
pub const RFID_SPI_HZ: u32 = 4_000_000;

// ---------------------------------------------------------------------------
// Lock relay
// ---------------------------------------------------------------------------

/// Digital output driving the relay module (active HIGH).
pub const RELAY_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// Auxiliary analog input
// ---------------------------------------------------------------------------

/// Supply/battery voltage divider.
/// ADC1 channel 0 (GPIO 36 / SENSOR_VP on ESP32).
pub const VOLTAGE_ADC_GPIO: i32 = 36;
