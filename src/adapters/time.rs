//! ESP32 clock adapter.
//!
//! Implements [`ClockPort`] with the two time domains the access core
//! needs.
//!
//! - **`target_os = "espidf"`** — monotonic time from
//!   `esp_timer_get_time()` (microsecond precision); calendar time from
//!   `gettimeofday()`, which SNTP sets once the network is up.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` for
//!   monotonic time; the calendar clock reports `None` unless a test
//!   pins it with [`Esp32Clock::set_calendar_secs`].

use crate::app::ports::ClockPort;

/// Anything earlier than 2020-01-01 is the RTC's power-on default, not a
/// synchronised wall clock.
pub const EPOCH_2020: i64 = 1_577_836_800;

/// Clock adapter for the ESP32 platform.
pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    #[cfg(not(target_os = "espidf"))]
    calendar: Option<i64>,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            calendar: None,
        }
    }

    /// Simulation only: pin the wall clock to `secs` (or unsync it).
    #[cfg(not(target_os = "espidf"))]
    pub fn set_calendar_secs(&mut self, secs: Option<i64>) {
        self.calendar = secs;
    }
}

impl ClockPort for Esp32Clock {
    #[cfg(target_os = "espidf")]
    fn monotonic_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn monotonic_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_os = "espidf")]
    fn calendar_secs(&self) -> Option<i64> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        let secs = tv.tv_sec as i64;
        (secs >= EPOCH_2020).then_some(secs)
    }

    #[cfg(not(target_os = "espidf"))]
    fn calendar_secs(&self) -> Option<i64> {
        self.calendar.filter(|&s| s >= EPOCH_2020)
    }
}
