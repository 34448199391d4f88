//! Decision engine — one verdict per presented credential.
//!
//! The engine owns the cooldown and daily-quota state and is the only
//! thing that mutates it.  Each [`ScanEvent`] is evaluated in a fixed
//! order:
//!
//! ```text
//!   authorized? ──no──▶ DeniedUnauthorized
//!       │yes
//!   quota left? ──no──▶ DeniedQuotaExceeded
//!       │yes
//!   cooled down? ─no──▶ DeniedRateLimited
//!       │yes
//!   Granted  (cooldown restarted, quota +1, lifetime counter +1)
//! ```
//!
//! Authorization comes first so an unknown tag can never burn quota or
//! restart the cooldown.  Every denial leaves the state untouched.
//!
//! The engine does no I/O; sensor sampling, relay actuation and telemetry
//! are driven from the returned [`Decision`] by
//! [`AccessService`](crate::app::service::AccessService).

use core::fmt;

use crate::config::SystemConfig;

use super::credential::{AuthorizedSet, CredentialVerifier, Uid};
use super::quota::DailyQuota;
use super::rate_limiter::RateLimiter;

/// A credential presentation, stamped when the reader surfaced it.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub uid: Uid,
    /// Monotonic ms since boot.
    pub monotonic_ms: u64,
    /// Unix seconds, `None` while the wall clock is unsynchronised.
    pub calendar_secs: Option<i64>,
}

/// Outcome of evaluating one [`ScanEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Granted,
    DeniedUnauthorized,
    DeniedRateLimited,
    DeniedQuotaExceeded,
}

impl Verdict {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::DeniedUnauthorized => write!(f, "denied (unauthorized)"),
            Self::DeniedRateLimited => write!(f, "denied (cooldown active)"),
            Self::DeniedQuotaExceeded => write!(f, "denied (daily quota reached)"),
        }
    }
}

/// A verdict plus the lifetime grant number it was assigned, if granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub sequence: Option<u32>,
}

/// The access-control core.
pub struct DecisionEngine<V = AuthorizedSet> {
    verifier: V,
    rate: RateLimiter,
    quota: DailyQuota,
    /// Grants since boot; never reset.
    lifetime_grants: u32,
}

impl DecisionEngine<AuthorizedSet> {
    /// Build the byte-equality engine from configuration.
    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            config.authorized_uids.iter().copied().collect(),
            RateLimiter::new(config.cooldown_ms),
            DailyQuota::new(config.max_daily_scans),
        )
    }
}

impl<V: CredentialVerifier> DecisionEngine<V> {
    pub fn new(verifier: V, rate: RateLimiter, quota: DailyQuota) -> Self {
        Self {
            verifier,
            rate,
            quota,
            lifetime_grants: 0,
        }
    }

    /// Day-boundary check.  Run once per loop iteration, before any
    /// [`decide`](Self::decide) in that iteration.
    ///
    /// Returns the closed window's grant count when the window rolled.
    pub fn roll_window(&mut self, calendar_secs: Option<i64>) -> Option<u16> {
        self.quota.maybe_roll_window(calendar_secs)
    }

    /// Evaluate one scan.
    pub fn decide(&mut self, event: &ScanEvent) -> Decision {
        let verdict = if !self.verifier.is_authorized(&event.uid) {
            Verdict::DeniedUnauthorized
        } else if !self.quota.has_quota_remaining() {
            Verdict::DeniedQuotaExceeded
        } else if !self.rate.can_scan_now(event.monotonic_ms) {
            Verdict::DeniedRateLimited
        } else {
            self.rate.record_grant(event.monotonic_ms);
            self.quota.record_grant();
            self.lifetime_grants = self.lifetime_grants.saturating_add(1);
            return Decision {
                verdict: Verdict::Granted,
                sequence: Some(self.lifetime_grants),
            };
        };

        Decision {
            verdict,
            sequence: None,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn lifetime_grants(&self) -> u32 {
        self.lifetime_grants
    }

    pub fn granted_today(&self) -> u16 {
        self.quota.granted_today()
    }

    pub fn quota(&self) -> &DailyQuota {
        &self.quota
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }
}
