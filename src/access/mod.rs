//! Access-control domain core — pure logic, zero I/O.
//!
//! Identity matching, the global cooldown, the daily quota, and the
//! decision engine that combines them into one verdict per scan.  The
//! actuation controller and telemetry shaping turn a verdict into relay
//! and datastore effects through the port traits in
//! [`crate::app::ports`].

pub mod actuation;
pub mod credential;
pub mod engine;
pub mod quota;
pub mod rate_limiter;
pub mod telemetry;
