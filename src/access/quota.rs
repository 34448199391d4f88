//! Daily grant quota.
//!
//! Counts grants inside a calendar-day window and refuses further grants
//! once `max_daily_scans` is reached.  The window rolls over when a full
//! day (86 400 s of calendar time) has passed since it started, and is
//! checked once per control-loop iteration whether or not a card was
//! presented, so an idle controller still resets on time.
//!
//! ## Unsynchronised clock
//!
//! The window is anchored at the first *synchronised* calendar reading.
//! Until then (`calendar = None`) rolling is a no-op and grants count
//! against that first, not-yet-anchored window.  A calendar reading that
//! lies before the window start (clock stepped backwards) is ignored, so
//! the window start only ever moves forward.

/// Length of one quota window in calendar seconds.
pub const DAY_SECS: i64 = 86_400;

/// Daily grant counter.
#[derive(Debug, Clone)]
pub struct DailyQuota {
    max_daily: u16,
    granted_today: u16,
    /// Unix seconds; `None` until the calendar clock is first synchronised.
    window_start: Option<i64>,
}

impl DailyQuota {
    pub fn new(max_daily: u16) -> Self {
        Self {
            max_daily,
            granted_today: 0,
            window_start: None,
        }
    }

    /// Start a new window if a full day has elapsed.
    ///
    /// Returns the count of the window that just closed, or `None` if the
    /// window did not roll.
    pub fn maybe_roll_window(&mut self, calendar_secs: Option<i64>) -> Option<u16> {
        let now = calendar_secs?;
        match self.window_start {
            None => {
                self.window_start = Some(now);
                None
            }
            Some(start) if now.saturating_sub(start) >= DAY_SECS => {
                let closed = self.granted_today;
                self.granted_today = 0;
                self.window_start = Some(now);
                Some(closed)
            }
            Some(_) => None,
        }
    }

    pub fn has_quota_remaining(&self) -> bool {
        self.granted_today < self.max_daily
    }

    /// Count one grant.  Only valid when [`has_quota_remaining`] held at
    /// decision time; saturates at the maximum otherwise.
    ///
    /// [`has_quota_remaining`]: Self::has_quota_remaining
    pub fn record_grant(&mut self) {
        debug_assert!(self.has_quota_remaining());
        if self.has_quota_remaining() {
            self.granted_today += 1;
        }
    }

    pub fn granted_today(&self) -> u16 {
        self.granted_today
    }

    pub fn max_daily(&self) -> u16 {
        self.max_daily
    }

    pub fn window_start(&self) -> Option<i64> {
        self.window_start
    }
}
