//! Global grant cooldown.
//!
//! One cooldown clock for the whole controller: any grant, whichever
//! credential triggered it, blocks every subsequent grant until
//! `cooldown_ms` of monotonic time has passed.  Calendar time is never
//! consulted, so wall-clock adjustments cannot shorten or extend it.

/// Cooldown tracker, measured on the monotonic clock (ms since boot).
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cooldown_ms: u64,
    /// `None` until the first grant.
    last_grant_ms: Option<u64>,
}

impl RateLimiter {
    pub fn new(cooldown_ms: u32) -> Self {
        Self {
            cooldown_ms: cooldown_ms as u64,
            last_grant_ms: None,
        }
    }

    /// `false` iff a grant happened less than `cooldown_ms` ago.
    pub fn can_scan_now(&self, now_ms: u64) -> bool {
        self.remaining_ms(now_ms) == 0
    }

    /// Cooldown left before the next grant is possible (0 = ready).
    ///
    /// A reading earlier than the last grant counts as zero elapsed.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.last_grant_ms {
            None => 0,
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                self.cooldown_ms.saturating_sub(elapsed)
            }
        }
    }

    /// Restart the cooldown.  Call exactly once per granted verdict, with
    /// the monotonic time of that decision.
    pub fn record_grant(&mut self, now_ms: u64) {
        self.last_grant_ms = Some(now_ms);
    }

    pub fn last_grant_ms(&self) -> Option<u64> {
        self.last_grant_ms
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }
}
