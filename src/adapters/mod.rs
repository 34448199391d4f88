//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                 | Connects to                 |
//! |-------------|----------------------------|-----------------------------|
//! | `hardware`  | SensorPort, RelayPort      | ESP32 ADC, GPIO             |
//! |             | DelayNs                    | FreeRTOS delay              |
//! | `log_sink`  | EventSink                  | Serial log output           |
//! | `nvs`       | ConfigPort                 | NVS / in-memory store       |
//! | `telemetry` | TelemetryPort              | Uplink channel              |
//! | `time`      | ClockPort                  | esp_timer + SNTP wall clock |
//! | `uplink`    | (thread) RemoteStore       | HTTPS datastore             |
//! | `wifi`      | ConnectivityPort           | ESP-IDF WiFi STA            |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod telemetry;
pub mod time;
pub mod uplink;
pub mod wifi;
